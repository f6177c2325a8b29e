use lockstep_serde::SerdeErr;
use thiserror::Error;

use crate::{events::EventKind, types::FrameNumber};

/// Errors raised while authoring an Event, always before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The target frame does not lie far enough in the future
    #[error("Lookahead violation: event authored at frame {authored_frame} targets frame {target_frame}, but the earliest permitted frame is {earliest_frame}")]
    LookaheadViolation {
        authored_frame: FrameNumber,
        target_frame: FrameNumber,
        earliest_frame: FrameNumber,
    },

    /// authored_frame + lookahead does not fit in the frame counter
    #[error("Frame counter overflow scheduling event authored at frame {authored_frame} with lookahead {lookahead}")]
    FrameOverflow {
        authored_frame: FrameNumber,
        lookahead: u32,
    },

    /// The payload variant does not belong to the requested kind
    #[error("Payload of kind {payload_kind:?} cannot be sent as an event of kind {kind:?}")]
    KindMismatch {
        kind: EventKind,
        payload_kind: EventKind,
    },

    /// The payload is larger than its kind allows
    #[error("Payload of kind {kind:?} is {size} bytes, the maximum for this kind is {max} bytes")]
    PayloadTooLarge {
        kind: EventKind,
        size: usize,
        max: usize,
    },
}

/// Errors raised while decoding Events received from the network.
/// A packet containing a malformed Event is dropped without acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    /// The kind tag is outside the known vocabulary
    #[error("Unknown event kind tag {value} (valid range: 0-{max}). This may indicate a malformed or malicious packet")]
    UnknownKind { value: u8, max: u8 },

    /// The bytes ended before the event was complete
    #[error("Truncated event: {0}")]
    Truncated(#[from] SerdeErr),

    /// A variable-length payload declared more bytes than its kind allows
    #[error("Event of kind {kind:?} declares {len} payload bytes, the maximum is {max}")]
    LengthOutOfRange {
        kind: EventKind,
        len: usize,
        max: usize,
    },

    /// Bytes remained after the last complete event of a single-event buffer
    #[error("{remaining} trailing bytes after event")]
    TrailingBytes { remaining: usize },
}
