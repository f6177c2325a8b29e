//! # Lockstep Peer
//! Runs a lockstep session for one participant: the session lives on the
//! caller's thread, datagrams move over a socket on a dedicated I/O thread.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use lockstep_shared::{
        content_checksum, Event, EventKind, EventPayload, FingerprintHasher, FrameNumber, PeerId,
        SessionConfig, SessionEvent, SessionFault, Simulation, SyncConfig, TransportConfig,
    };
}

mod error;
mod io_thread;
mod peer;
mod peer_config;

pub use error::PeerError;
pub use io_thread::IoThread;
pub use peer::Peer;
pub use peer_config::PeerConfig;
