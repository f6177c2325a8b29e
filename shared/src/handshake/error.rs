use thiserror::Error;

use crate::types::PeerId;

/// The setup value two peers disagreed on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SetupField {
    ProtocolVersion,
    ContentChecksum,
    Lookahead,
    FrameRate,
    MaxLookahead,
    SafetyMargin,
}

/// Errors raised by the one-time session setup handshake
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// A peer's setup does not match ours; the session can never start
    #[error("Setup mismatch with peer {peer_id}: {field:?} is {local} locally but {remote} remotely")]
    SetupMismatch {
        peer_id: PeerId,
        field: SetupField,
        local: u32,
        remote: u32,
    },

    /// The setup packet payload could not be parsed
    #[error("Malformed setup payload of {len} bytes, expected {expected}")]
    MalformedSetup { len: usize, expected: usize },
}
