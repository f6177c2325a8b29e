use std::{io, net::SocketAddr};

use thiserror::Error;

use lockstep_shared::{PeerId, SessionError};

/// Errors raised while setting up or driving a [`crate::Peer`]
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("Unable to bind UDP socket at {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Unable to start the I/O thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Remote peer {peer_id} has no address")]
    MissingAddress { peer_id: PeerId },

    #[error(transparent)]
    Session(#[from] SessionError),
}
