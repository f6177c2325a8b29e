use std::{
    collections::{BTreeMap, BTreeSet},
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::{
    backends::Timer,
    events::Event,
    handshake::{SetupHandshake, SetupStatus},
    session_state::SessionState,
    sync::{ExecutionBatch, FrameBucket, SyncConfig, SyncError},
    types::{FrameNumber, PeerId},
    validation::{ConsistencyValidator, ValidatorFault},
};

/// Where the lockstep barrier currently stands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for every peer's setup to arrive and match
    AwaitingSetup,
    /// Waiting for contributions to the frame
    Accumulating(FrameNumber),
    /// Every contribution has arrived; the frame can be executed
    Ready(FrameNumber),
    /// Handed to the simulation, waiting for its fingerprint
    Executing(FrameNumber),
    /// Unrecoverable fault; no further frame will execute
    Halted,
}

/// The lockstep barrier.
///
/// Buffers events by the frame they target and hands out exactly one
/// [`ExecutionBatch`] per frame, in increasing frame order, once every
/// alive peer has contributed to it.
pub struct FrameSynchronizer {
    config: SyncConfig,
    sync_state: SyncState,
    buckets: BTreeMap<FrameNumber, FrameBucket>,
    lost: BTreeSet<PeerId>,
    recalculate_timer: Option<Timer>,
    waiting_since: Option<Instant>,
}

impl FrameSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            sync_state: SyncState::AwaitingSetup,
            buckets: BTreeMap::new(),
            lost: BTreeSet::new(),
            recalculate_timer: None,
            waiting_since: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    pub fn is_halted(&self) -> bool {
        self.sync_state == SyncState::Halted
    }

    /// Enters frame 0 once the setup handshake has completed.
    ///
    /// Frames below the lookahead cannot receive commands, so they start
    /// filled with nothing from every peer.
    pub fn start(
        &mut self,
        handshake: &SetupHandshake,
        state: &mut SessionState,
        now: &Instant,
    ) -> Result<(), SyncError> {
        match self.sync_state {
            SyncState::AwaitingSetup => {}
            SyncState::Halted => return Err(SyncError::Halted),
            _ => return Err(SyncError::AlreadyStarted),
        }

        match handshake.status() {
            Ok(SetupStatus::Complete) => {}
            Ok(SetupStatus::Pending { waiting_on }) => {
                return Err(SyncError::SetupPending { waiting_on });
            }
            Err(error) => {
                warn!("{}", error);
                self.sync_state = SyncState::Halted;
                return Err(error.into());
            }
        }

        let participants: Vec<PeerId> = std::iter::once(state.local_peer())
            .chain(state.remote_peer_ids())
            .collect();
        for frame in 0..self.config.lookahead {
            let bucket = self
                .buckets
                .entry(frame)
                .or_insert_with(|| FrameBucket::new(frame));
            for peer_id in &participants {
                bucket.mark_filled(*peer_id);
            }
        }

        state.set_frame(0);
        state.set_max_ahead(self.config.lookahead);
        self.recalculate_timer = Some(Timer::new(self.config.recalculate_interval, now));
        self.sync_state = SyncState::Accumulating(0);
        self.update_ack_frames(state, participants);
        self.refresh_readiness(state);

        info!(
            "Lockstep started with {} peers at {} frames/s, lookahead {}",
            state.remote_peer_ids().count() + 1,
            self.config.frame_rate,
            self.config.lookahead
        );
        Ok(())
    }

    /// Routes events into the bucket of the frame they target, marking the
    /// origin's slot in that bucket filled.
    ///
    /// A peer's contribution for a frame always travels in a single packet,
    /// so the first event seen for a (peer, frame) pair completes the slot.
    /// The transport has already acknowledged every event handed in here, so
    /// only events for frames already executed are dropped. Events further
    /// ahead than any agreed MaxAhead allows are still buffered.
    pub fn ingest(&mut self, state: &mut SessionState, events: impl IntoIterator<Item = Event>) {
        if self.is_halted() {
            return;
        }
        let next_frame = self.next_frame(state);
        let horizon = next_frame
            .saturating_add(self.config.max_lookahead.saturating_mul(2))
            .saturating_add(1);

        let mut touched = BTreeSet::new();
        for event in events {
            let origin = event.origin();
            let frame = event.target_frame();
            if !state.is_alive(origin) {
                debug!("Dropping event for frame {} from peer {} no longer alive", frame, origin);
                continue;
            }
            if frame < next_frame {
                warn!(
                    "Dropping late {:?} event for frame {} from peer {}; frame {} is next",
                    event.kind(),
                    frame,
                    origin,
                    next_frame
                );
                continue;
            }
            if frame > horizon {
                warn!(
                    "Buffering {:?} event for frame {} from peer {} beyond frame {}",
                    event.kind(),
                    frame,
                    origin,
                    horizon
                );
            }
            self.buckets
                .entry(frame)
                .or_insert_with(|| FrameBucket::new(frame))
                .insert(event);
            touched.insert(origin);
        }

        self.update_ack_frames(state, touched);
        self.refresh_readiness(state);
    }

    /// Whether every alive peer has contributed to `frame`
    pub fn is_frame_ready(&self, state: &SessionState, frame: FrameNumber) -> bool {
        self.buckets
            .get(&frame)
            .is_some_and(|bucket| bucket.is_complete(state))
    }

    /// Peers whose contribution to the next frame is still missing
    pub fn waiting_on(&self, state: &SessionState) -> Vec<PeerId> {
        let frame = self.next_frame(state);
        match self.buckets.get(&frame) {
            Some(bucket) => bucket.waiting_on(state),
            None => FrameBucket::new(frame).waiting_on(state),
        }
    }

    /// How long the barrier has been holding the next frame
    pub fn stalled_for(&self, now: &Instant) -> Duration {
        self.waiting_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since))
    }

    /// Hands out the next frame if it is ready. Never blocks.
    pub fn advance(&mut self, state: &SessionState, now: &Instant) -> Option<ExecutionBatch> {
        self.refresh_readiness(state);
        let SyncState::Ready(frame) = self.sync_state else {
            if matches!(self.sync_state, SyncState::Accumulating(_)) && self.waiting_since.is_none() {
                self.waiting_since = Some(*now);
            }
            return None;
        };

        let bucket = self.buckets.remove(&frame)?;
        if let Some(since) = self.waiting_since.take() {
            let waited = now.saturating_duration_since(since);
            if waited > Duration::from_secs(1) {
                info!("Frame {} released after waiting {:?}", frame, waited);
            }
        }

        self.sync_state = SyncState::Executing(frame);
        Some(bucket.into_batch(state))
    }

    /// Stores the fingerprint of the executing frame, moves on to the next
    /// frame and hands the fingerprint to the validator. Returns the
    /// heartbeat to broadcast along with any desync detected.
    pub fn record_fingerprint(
        &mut self,
        state: &mut SessionState,
        frame: FrameNumber,
        value: u32,
        validator: &mut ConsistencyValidator,
    ) -> Result<(Event, Vec<ValidatorFault>), SyncError> {
        match self.sync_state {
            SyncState::Executing(executing) if executing == frame => {}
            SyncState::Executing(executing) => {
                return Err(SyncError::UnexpectedFingerprint {
                    frame,
                    executing: Some(executing),
                })
            }
            SyncState::Halted => return Err(SyncError::Halted),
            SyncState::AwaitingSetup => return Err(SyncError::NotStarted),
            _ => {
                return Err(SyncError::UnexpectedFingerprint {
                    frame,
                    executing: None,
                })
            }
        }

        let next = frame.wrapping_add(1);
        state.set_frame(next);
        self.sync_state = SyncState::Accumulating(next);
        self.refresh_readiness(state);

        Ok(validator.submit_local(state, frame, value))
    }

    /// Stops waiting on a peer the transport has given up on. Returns false
    /// once no remote peer is left alive after a loss, in which case the
    /// synchronizer halts.
    pub fn mark_peer_lost(&mut self, state: &SessionState, peer_id: PeerId) -> bool {
        if self.lost.insert(peer_id) {
            info!("Frame barrier no longer waits on peer {}", peer_id);
        }
        if state.alive_peer_ids().next().is_none() {
            warn!("Every remote peer has been lost; halting");
            self.halt();
            return false;
        }
        self.refresh_readiness(state);
        true
    }

    /// Stops waiting on a peer that left gracefully
    pub fn remove_peer(&mut self, state: &SessionState, peer_id: PeerId) {
        debug!("Peer {} left the frame barrier", peer_id);
        self.refresh_readiness(state);
    }

    pub fn lost_peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.lost.iter().copied()
    }

    pub fn halt(&mut self) {
        self.sync_state = SyncState::Halted;
    }

    pub fn bucket(&self, frame: FrameNumber) -> Option<&FrameBucket> {
        self.buckets.get(&frame)
    }

    pub fn pending_frames(&self) -> usize {
        self.buckets.len()
    }

    /// Re-derives MaxAhead from the worst observed round trip, at most once
    /// per `recalculate_interval`. Returns the new value when it changed.
    pub fn recalculate_max_ahead(&mut self, state: &mut SessionState, now: &Instant) -> Option<u32> {
        let timer = self.recalculate_timer.as_mut()?;
        if !timer.ringing(now) {
            return None;
        }
        timer.reset(now);

        let worst = state
            .peers()
            .filter(|peer| peer.is_alive() && peer.has_round_trip_sample())
            .map(|peer| peer.max_round_trip())
            .max()?;

        let frame_nanos = self.config.frame_duration().as_nanos().max(1);
        let latency_frames = u32::try_from(worst.as_nanos().div_ceil(frame_nanos)).unwrap_or(u32::MAX);
        let max_ahead = latency_frames
            .saturating_add(self.config.safety_margin)
            .clamp(self.config.lookahead, self.config.max_lookahead.max(self.config.lookahead));

        if max_ahead == state.max_ahead() {
            return None;
        }
        info!(
            "MaxAhead {} -> {} (worst round trip {:?})",
            state.max_ahead(),
            max_ahead,
            worst
        );
        state.set_max_ahead(max_ahead);
        Some(max_ahead)
    }

    fn next_frame(&self, state: &SessionState) -> FrameNumber {
        match self.sync_state {
            SyncState::AwaitingSetup => 0,
            // the executing frame is no longer accepting events
            SyncState::Executing(frame) => frame.wrapping_add(1),
            _ => state.frame(),
        }
    }

    fn refresh_readiness(&mut self, state: &SessionState) {
        if let SyncState::Accumulating(frame) = self.sync_state {
            if self.is_frame_ready(state, frame) {
                self.sync_state = SyncState::Ready(frame);
            }
        }
    }

    /// Advances each peer's highest contiguously contributed frame
    fn update_ack_frames(&self, state: &mut SessionState, peers: impl IntoIterator<Item = PeerId>) {
        let next_frame = self.next_frame(state);
        for peer_id in peers {
            let Some(peer) = state.peer_mut(peer_id) else {
                continue;
            };
            // frames already executed were necessarily contributed
            let mut next = peer
                .last_ack_frame()
                .map_or(0, |frame| frame.wrapping_add(1))
                .max(next_frame);
            let mut advanced = false;
            while self
                .buckets
                .get(&next)
                .is_some_and(|bucket| bucket.is_filled(peer_id))
            {
                next = next.wrapping_add(1);
                advanced = true;
            }
            if advanced {
                peer.set_last_ack_frame(next.wrapping_sub(1));
            }
        }
    }
}
