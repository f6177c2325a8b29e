use lockstep_serde::SerdeErr;
use thiserror::Error;

use crate::types::PeerId;

/// Errors raised while framing or parsing wire packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Invalid packet type received (SECURITY: potentially malicious packet)
    #[error("Invalid packet type {value} received (valid range: 0-4). This may indicate a malformed or malicious packet")]
    UnknownPacketType { value: u8 },

    /// The header or payload ended early
    #[error("Truncated packet: {0}")]
    Truncated(#[from] SerdeErr),

    /// payload_len points past the end of the datagram
    #[error("Header declares {declared} payload bytes but only {available} remain in the datagram")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// The payload cannot be framed with a 16-bit length
    #[error("Payload of {len} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// ACK payloads are a whole number of 4-byte sequence numbers
    #[error("ACK payload of {len} bytes is not a multiple of 4")]
    MisalignedAck { len: usize },

    /// The header names a different sender than the link it arrived on
    #[error("Packet claims sender {claimed} but arrived from peer {actual}")]
    SenderMismatch { claimed: PeerId, actual: PeerId },
}
