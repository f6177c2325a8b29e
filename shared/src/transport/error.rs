use thiserror::Error;

use crate::{
    connection::{error::PacketError, packet_type::PacketType}, events::MalformedEvent, handshake::HandshakeError,
    types::PeerId,
};

/// Errors raised by the Transport Buffer. None of these are fatal: a
/// rejected packet is simply not acknowledged and the sender retransmits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer id is not part of this session
    #[error("Peer {peer_id} is not part of this session")]
    UnknownPeer { peer_id: PeerId },

    /// Sending to a peer that has been lost or has departed
    #[error("Peer {peer_id} is no longer alive")]
    PeerNotAlive { peer_id: PeerId },

    /// Only reliable packet types can be queued; ACKs are generated internally
    #[error("Packet type {packet_type:?} cannot be queued for reliable delivery")]
    NotReliable { packet_type: PacketType },

    /// The payload would not fit in a single packet
    #[error("Payload of {len} bytes exceeds the packet payload limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// Packet framing could not be parsed; the rest of the datagram was dropped
    #[error("Malformed packet from peer {peer_id}: {error}")]
    MalformedPacket { peer_id: PeerId, error: PacketError },

    /// An event inside the packet could not be decoded
    #[error("Malformed event from peer {peer_id}: {error}")]
    MalformedEvent {
        peer_id: PeerId,
        error: MalformedEvent,
    },

    /// A setup packet could not be decoded
    #[error("Malformed setup from peer {peer_id}: {error}")]
    MalformedSetup {
        peer_id: PeerId,
        error: HandshakeError,
    },

    /// An event claims to be authored by someone other than its sender
    #[error("Event from peer {peer_id} claims origin {origin}")]
    OriginMismatch { peer_id: PeerId, origin: PeerId },

    /// The sequence number is too far ahead of what has been delivered
    #[error("Sequence {sequence} from peer {peer_id} is outside the receive window")]
    OutsideReceiveWindow {
        peer_id: PeerId,
        sequence: u32,
    },
}

/// Faults surfaced by the Transport Buffer to the Frame Synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    /// Retransmission attempts were exhausted; the peer leaves the active set
    #[error("Peer {peer_id} lost after {attempts} unacknowledged transmissions")]
    PeerLost { peer_id: PeerId, attempts: u32 },
}
