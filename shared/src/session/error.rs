use thiserror::Error;

use crate::{
    events::{EventError, EventKind},
    handshake::HandshakeError,
    validation::ValidatorFault,
};

/// Fatal session faults, reported to the host exactly once
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFault {
    /// Fingerprints diverged; there is no automatic resynchronization
    #[error(transparent)]
    DesyncDetected(#[from] ValidatorFault),

    /// The session never starts
    #[error(transparent)]
    SetupMismatch(#[from] HandshakeError),

    #[error("Every remote peer has been lost")]
    AllPeersLost,
}

/// Errors returned to the host for a rejected request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Event(#[from] EventError),

    /// NoCommand and FrameInfo are generated by the session itself
    #[error("Events of kind {kind:?} are reserved for the session")]
    ReservedKind { kind: EventKind },

    #[error("Session has halted after a fatal fault")]
    Halted,

    #[error("Session is quitting")]
    Quitting,
}
