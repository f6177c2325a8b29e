use std::{
    default::Default,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use lockstep_shared::{PeerId, SessionConfig};

/// Contains Config properties which will be used by a Peer
#[derive(Clone, Debug)]
pub struct PeerConfig {
    /// Used to configure the lockstep session itself
    pub session: SessionConfig,
    /// Local address the UDP socket binds to
    pub bind_address: SocketAddr,
    /// Where every remote participant can be reached
    pub peer_addresses: Vec<(PeerId, SocketAddr)>,
    /// How long the I/O thread sleeps when the socket has nothing to read
    pub poll_interval: Duration,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            peer_addresses: Vec::new(),
            poll_interval: Duration::from_millis(2),
        }
    }
}
