use thiserror::Error;

use crate::{
    handshake::HandshakeError,
    types::{FrameNumber, PeerId},
};

/// Errors raised by the Frame Synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Frame synchronizer has not started")]
    NotStarted,

    #[error("Frame synchronizer has already started")]
    AlreadyStarted,

    /// Frame 0 cannot be entered until every peer's setup has arrived
    #[error("Still waiting on setup from peers {waiting_on:?}")]
    SetupPending { waiting_on: Vec<PeerId> },

    /// Peers disagree on the session setup; the session never starts
    #[error(transparent)]
    Setup(#[from] HandshakeError),

    /// A fingerprint was recorded for a frame that is not executing
    #[error("Fingerprint recorded for frame {frame} while executing {executing:?}")]
    UnexpectedFingerprint {
        frame: FrameNumber,
        executing: Option<FrameNumber>,
    },

    #[error("Frame synchronizer has halted")]
    Halted,
}
