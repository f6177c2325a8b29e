mod error;
mod event;
mod event_kind;
mod event_payload;

pub use error::{EventError, MalformedEvent};
pub use event::{Event, EVENT_HEADER_LEN};
pub use event_kind::{EventKind, MAX_MESSAGE_LEN};
pub use event_payload::EventPayload;
