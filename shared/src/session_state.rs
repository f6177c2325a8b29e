use std::collections::BTreeMap;

use crate::{
    transport::{PeerState, PeerStatus},
    types::{FrameNumber, PeerId},
};

/// The session-wide counters and peer table shared by the Transport Buffer,
/// Frame Synchronizer and Consistency Validator.
///
/// Only the transport and the synchronizer mutate the peer table; everyone
/// else gets read-only access.
pub struct SessionState {
    local_peer: PeerId,
    /// Next frame to execute
    frame: FrameNumber,
    /// Frames a locally authored event is scheduled into the future
    max_ahead: u32,
    peers: BTreeMap<PeerId, PeerState>,
}

impl SessionState {
    pub fn new(
        local_peer: PeerId,
        remote_peers: impl IntoIterator<Item = PeerId>,
        lookahead: u32,
    ) -> Self {
        let peers = remote_peers
            .into_iter()
            .filter(|peer_id| *peer_id != local_peer)
            .map(|peer_id| (peer_id, PeerState::new(peer_id)))
            .collect();
        Self {
            local_peer,
            frame: 0,
            max_ahead: lookahead,
            peers,
        }
    }

    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    pub fn frame(&self) -> FrameNumber {
        self.frame
    }

    pub fn max_ahead(&self) -> u32 {
        self.max_ahead
    }

    pub fn peer(&self, peer_id: PeerId) -> Option<&PeerState> {
        self.peers.get(&peer_id)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerState> {
        self.peers.values()
    }

    pub fn remote_peer_ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.keys().copied()
    }

    pub fn alive_peer_ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers
            .values()
            .filter(|peer| peer.is_alive())
            .map(|peer| peer.peer_id())
    }

    pub fn is_alive(&self, peer_id: PeerId) -> bool {
        peer_id == self.local_peer || self.peer(peer_id).is_some_and(PeerState::is_alive)
    }

    pub(crate) fn peer_mut(&mut self, peer_id: PeerId) -> Option<&mut PeerState> {
        self.peers.get_mut(&peer_id)
    }

    /// Marks a peer as gone. Returns true if it was alive until now.
    pub(crate) fn retire_peer(&mut self, peer_id: PeerId, status: PeerStatus) -> bool {
        match self.peers.get_mut(&peer_id) {
            Some(peer) if peer.is_alive() => {
                peer.set_status(status);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_frame(&mut self, frame: FrameNumber) {
        self.frame = frame;
    }

    pub(crate) fn set_max_ahead(&mut self, max_ahead: u32) {
        self.max_ahead = max_ahead;
    }
}
