use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::{debug, warn};

use crate::{
    events::Event,
    session_state::SessionState,
    types::{FrameNumber, PeerId},
    validation::{Fingerprint, ValidatorConfig, ValidatorFault},
};

#[derive(Default)]
struct FrameRecord {
    local: Option<u32>,
    remote: BTreeMap<PeerId, u32>,
    /// Peers whose fingerprint has been compared with ours for this frame
    resolved: BTreeSet<PeerId>,
}

/// Compares the local fingerprint of every executed frame with the ones
/// reported by remote peers.
///
/// Local and remote fingerprints may arrive in either order. A frame is
/// forgotten once every alive peer has been compared, or once it falls out
/// of the retention window.
pub struct ConsistencyValidator {
    config: ValidatorConfig,
    local_peer: PeerId,
    records: BTreeMap<FrameNumber, FrameRecord>,
    /// Peers already reported as desynced; further mismatches are suppressed
    faulted: BTreeSet<PeerId>,
    recent: VecDeque<Fingerprint>,
    newest_local: Option<FrameNumber>,
    unresolved: u64,
}

impl ConsistencyValidator {
    pub fn new(config: ValidatorConfig, state: &SessionState) -> Self {
        Self {
            config,
            local_peer: state.local_peer(),
            records: BTreeMap::new(),
            faulted: BTreeSet::new(),
            recent: VecDeque::new(),
            newest_local: None,
            unresolved: 0,
        }
    }

    /// Stores the fingerprint of a locally executed frame and returns the
    /// heartbeat to broadcast, along with any mismatch against fingerprints
    /// that arrived first.
    pub fn submit_local(
        &mut self,
        state: &SessionState,
        frame: FrameNumber,
        value: u32,
    ) -> (Event, Vec<ValidatorFault>) {
        self.recent.push_back(Fingerprint::new(frame, value));
        while self.recent.len() > self.config.diagnostic_ring_len {
            self.recent.pop_front();
        }
        self.newest_local = Some(self.newest_local.map_or(frame, |newest| newest.max(frame)));

        let record = self.records.entry(frame).or_default();
        record.local = Some(value);
        let peers: Vec<PeerId> = record.remote.keys().copied().collect();

        let mut faults = Vec::new();
        for peer_id in peers {
            if let Some(fault) = self.compare(frame, peer_id) {
                faults.push(fault);
            }
        }

        self.discard_expired();
        self.prune_resolved(state);

        (Event::frame_info(self.local_peer, frame, value), faults)
    }

    /// Records a fingerprint reported by `peer_id`. Returns a fault the
    /// first time this peer disagrees with us.
    pub fn on_remote(
        &mut self,
        state: &SessionState,
        peer_id: PeerId,
        frame: FrameNumber,
        value: u32,
    ) -> Option<ValidatorFault> {
        if peer_id == self.local_peer || !state.is_alive(peer_id) {
            return None;
        }
        if !self.in_window(frame) {
            debug!(
                "Ignoring fingerprint for frame {} from peer {} outside the window",
                frame, peer_id
            );
            return None;
        }

        let record = self.records.entry(frame).or_default();
        if record.resolved.contains(&peer_id) || record.remote.contains_key(&peer_id) {
            return None;
        }
        record.remote.insert(peer_id, value);

        let fault = self.compare(frame, peer_id);
        self.prune_resolved(state);
        fault
    }

    /// Stops waiting on a peer that is no longer alive
    pub fn forget_peer(&mut self, state: &SessionState, peer_id: PeerId) {
        for record in self.records.values_mut() {
            record.remote.remove(&peer_id);
        }
        self.prune_resolved(state);
    }

    /// Frames discarded before every peer's fingerprint could be compared
    pub fn unresolved_count(&self) -> u64 {
        self.unresolved
    }

    /// Frames still waiting on at least one fingerprint
    pub fn pending_frames(&self) -> usize {
        self.records.len()
    }

    pub fn recent_fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.recent.iter()
    }

    fn compare(&mut self, frame: FrameNumber, peer_id: PeerId) -> Option<ValidatorFault> {
        let record = self.records.get_mut(&frame)?;
        let local = record.local?;
        let remote = *record.remote.get(&peer_id)?;
        record.resolved.insert(peer_id);
        record.remote.remove(&peer_id);

        if local == remote || self.faulted.contains(&peer_id) {
            return None;
        }
        self.faulted.insert(peer_id);

        let fault = ValidatorFault::DesyncDetected {
            frame,
            peer_id,
            local,
            remote,
        };
        warn!("{}", fault);
        warn!("Recent local fingerprints: {:?}", self.recent);
        Some(fault)
    }

    fn in_window(&self, frame: FrameNumber) -> bool {
        let window = self.config.window;
        match self.newest_local {
            None => frame < window,
            Some(newest) => {
                frame.saturating_add(window) > newest && frame <= newest.saturating_add(window)
            }
        }
    }

    fn discard_expired(&mut self) {
        let Some(newest) = self.newest_local else {
            return;
        };
        let window = self.config.window;
        let expired: Vec<FrameNumber> = self
            .records
            .keys()
            .copied()
            .filter(|frame| frame.saturating_add(window) <= newest)
            .collect();
        for frame in expired {
            self.records.remove(&frame);
            self.unresolved += 1;
            warn!(
                "Discarding unresolved fingerprints for frame {} (outside the {}-frame window)",
                frame, window
            );
        }
    }

    fn prune_resolved(&mut self, state: &SessionState) {
        let alive: Vec<PeerId> = state.alive_peer_ids().collect();
        self.records.retain(|_, record| {
            let done = record.local.is_some()
                && alive.iter().all(|peer_id| record.resolved.contains(peer_id));
            !done
        });
    }
}
