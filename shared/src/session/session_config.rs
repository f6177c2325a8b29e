use std::{default::Default, time::Duration};

use crate::{
    sync::SyncConfig, transport::TransportConfig, types::PeerId, validation::ValidatorConfig,
};

/// Contains Config properties which will be used by a Session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub local_peer: PeerId,
    /// Every other participant, fixed for the lifetime of the session
    pub remote_peers: Vec<PeerId>,
    /// Checksum of the scenario and rules content; must match on every peer
    pub content_checksum: u32,
    pub sync: SyncConfig,
    pub transport: TransportConfig,
    pub validator: ValidatorConfig,
    /// How long a quitting peer waits for its disconnect to be acknowledged
    pub disconnect_timeout: Duration,
}

impl SessionConfig {
    pub fn new(local_peer: PeerId, remote_peers: Vec<PeerId>, content_checksum: u32) -> Self {
        Self {
            local_peer,
            remote_peers,
            content_checksum,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_peer: 0,
            remote_peers: Vec::new(),
            content_checksum: 0,
            sync: SyncConfig::default(),
            transport: TransportConfig::default(),
            validator: ValidatorConfig::default(),
            disconnect_timeout: Duration::from_millis(500),
        }
    }
}
