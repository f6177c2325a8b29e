//! # Lockstep Shared
//! Deterministic lockstep synchronization core: typed command events, a
//! reliable transport buffer over unreliable datagrams, the frame barrier,
//! and fingerprint-based desync detection.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use lockstep_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

mod backends;
mod connection;
mod events;
mod handshake;
mod sequence_list;
mod session;
mod session_state;
mod sync;
mod transport;
mod types;
mod validation;
mod wrapping_number;

pub use backends::Timer;
pub use connection::{
    error::PacketError,
    packet::{decode_ack_payload, encode_ack_payload, split_datagram, Packet},
    packet_header::{PacketHeader, PACKET_HEADER_LEN},
    packet_type::PacketType,
};
pub use events::{
    Event, EventError, EventKind, EventPayload, MalformedEvent, EVENT_HEADER_LEN, MAX_MESSAGE_LEN,
};
pub use handshake::{
    HandshakeError, SetupField, SetupHandshake, SetupInfo, SetupStatus, PROTOCOL_VERSION,
};
pub use sequence_list::{SequenceError, SequenceList};
pub use session::{
    Session, SessionConfig, SessionError, SessionEvent, SessionFault, Simulation,
};
pub use session_state::SessionState;
pub use sync::{ExecutionBatch, FrameBucket, FrameSynchronizer, SyncConfig, SyncError, SyncState};
pub use transport::{
    ControlMessage, OutgoingDatagram, PeerState, PeerStatus, PendingReceiveEntry,
    PendingSendEntry, ReceivedDatagram, TransportBuffer, TransportConfig, TransportError,
    TransportFault, TransportHandle,
};
pub use types::{EntryId, FrameNumber, PeerId, SequenceNumber};
pub use validation::{
    content_checksum, ConsistencyValidator, Fingerprint, FingerprintHasher, ValidatorConfig,
    ValidatorFault,
};
pub use wrapping_number::{sequence_greater_than, sequence_less_than, wrapping_diff};
