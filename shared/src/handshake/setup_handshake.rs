use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};

use crate::{
    handshake::{HandshakeError, SetupInfo},
    types::PeerId,
};

/// Progress of the setup exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupStatus {
    Pending { waiting_on: Vec<PeerId> },
    Complete,
}

/// Collects every remote peer's SetupInfo and compares it with ours
pub struct SetupHandshake {
    local: SetupInfo,
    expected: BTreeSet<PeerId>,
    received: BTreeMap<PeerId, SetupInfo>,
}

impl SetupHandshake {
    pub fn new(local: SetupInfo, remote_peers: impl IntoIterator<Item = PeerId>) -> Self {
        Self {
            local,
            expected: remote_peers.into_iter().collect(),
            received: BTreeMap::new(),
        }
    }

    pub fn local(&self) -> &SetupInfo {
        &self.local
    }

    pub fn receive(&mut self, peer_id: PeerId, info: SetupInfo) {
        if !self.expected.contains(&peer_id) {
            warn!("Ignoring setup from unexpected peer {}", peer_id);
            return;
        }
        info!("Received setup from peer {}: {:?}", peer_id, info);
        self.received.insert(peer_id, info);
    }

    /// A peer lost before setup completes no longer gates the start
    pub fn forget_peer(&mut self, peer_id: PeerId) {
        self.expected.remove(&peer_id);
        self.received.remove(&peer_id);
    }

    pub fn status(&self) -> Result<SetupStatus, HandshakeError> {
        for (peer_id, remote) in &self.received {
            if let Some((field, local, remote)) = self.local.first_difference(remote) {
                return Err(HandshakeError::SetupMismatch {
                    peer_id: *peer_id,
                    field,
                    local,
                    remote,
                });
            }
        }

        let waiting_on: Vec<PeerId> = self
            .expected
            .iter()
            .filter(|peer_id| !self.received.contains_key(peer_id))
            .copied()
            .collect();
        if waiting_on.is_empty() {
            Ok(SetupStatus::Complete)
        } else {
            Ok(SetupStatus::Pending { waiting_on })
        }
    }
}
