use std::collections::{BTreeMap, BTreeSet};

use crate::{
    events::Event,
    session_state::SessionState,
    sync::ExecutionBatch,
    types::{FrameNumber, PeerId},
};

/// Collects every peer's contribution for one frame
#[derive(Clone, Debug)]
pub struct FrameBucket {
    frame_number: FrameNumber,
    events_by_peer: BTreeMap<PeerId, Vec<Event>>,
    filled: BTreeSet<PeerId>,
}

impl FrameBucket {
    pub fn new(frame_number: FrameNumber) -> Self {
        Self {
            frame_number,
            events_by_peer: BTreeMap::new(),
            filled: BTreeSet::new(),
        }
    }

    pub fn frame_number(&self) -> FrameNumber {
        self.frame_number
    }

    pub fn events_by_peer(&self) -> &BTreeMap<PeerId, Vec<Event>> {
        &self.events_by_peer
    }

    pub(crate) fn insert(&mut self, event: Event) {
        let origin = event.origin();
        self.events_by_peer.entry(origin).or_default().push(event);
        self.filled.insert(origin);
    }

    pub(crate) fn mark_filled(&mut self, peer_id: PeerId) {
        self.filled.insert(peer_id);
    }

    pub fn is_filled(&self, peer_id: PeerId) -> bool {
        self.filled.contains(&peer_id)
    }

    /// Every alive participant, the local peer included, has contributed.
    /// Lost and departed peers count as having contributed nothing.
    pub fn is_complete(&self, state: &SessionState) -> bool {
        self.is_filled(state.local_peer())
            && state.alive_peer_ids().all(|peer_id| self.is_filled(peer_id))
    }

    /// Peers whose contribution is still missing
    pub fn waiting_on(&self, state: &SessionState) -> Vec<PeerId> {
        std::iter::once(state.local_peer())
            .chain(state.alive_peer_ids())
            .filter(|peer_id| !self.is_filled(*peer_id))
            .collect()
    }

    pub(crate) fn into_batch(self, state: &SessionState) -> ExecutionBatch {
        let mut events: Vec<Event> = self
            .events_by_peer
            .into_values()
            .flatten()
            .filter(Event::is_game_visible)
            .collect();
        // stable: events of the same origin and kind keep their authored order
        events.sort_by_key(|event| (event.origin(), event.kind()));

        let lost = state
            .peers()
            .filter(|peer| !peer.is_alive())
            .map(|peer| peer.peer_id())
            .collect();

        ExecutionBatch {
            frame: self.frame_number,
            events,
            contributors: self.filled.into_iter().collect(),
            lost,
        }
    }
}
