mod channel;
mod udp;

pub use channel::ChannelSocket;
pub use udp::UdpPacketSocket;

use lockstep_shared::PeerId;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unable to send datagram to peer {peer_id}")]
pub struct SendError {
    pub peer_id: PeerId,
}

#[derive(Debug, Error)]
#[error("Unable to receive datagram")]
pub struct RecvError;

/// Unreliable datagram service between the participants of a session
pub trait PacketSocket: Send {
    /// Sends one datagram; delivery is not guaranteed
    fn send_to(&mut self, peer_id: PeerId, payload: &[u8]) -> Result<(), SendError>;
    /// Receives the next pending datagram, if any. Never blocks.
    fn receive(&mut self) -> Result<Option<(PeerId, &[u8])>, RecvError>;
}
