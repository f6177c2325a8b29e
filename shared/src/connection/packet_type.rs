// The different kinds of packets exchanged between peers

use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::connection::error::PacketError;

#[repr(u8)]
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum PacketType {
    // One or more encoded game Events
    Event = 0,
    // A list of acknowledged sequence numbers
    Ack = 1,
    // Frame fingerprints, encoded as FrameInfo Events
    Heartbeat = 2,
    // Graceful departure from the session
    Disconnect = 3,
    // Session setup handshake, sent once before frame 0
    Setup = 4,
}

impl PacketType {
    /// Every packet type except Ack is tracked for retransmission
    pub fn is_reliable(&self) -> bool {
        *self != PacketType::Ack
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        (*self as u8).ser(writer);
    }

    pub fn read(reader: &mut ByteReader) -> Result<Self, PacketError> {
        match u8::de(reader)? {
            0 => Ok(PacketType::Event),
            1 => Ok(PacketType::Ack),
            2 => Ok(PacketType::Heartbeat),
            3 => Ok(PacketType::Disconnect),
            4 => Ok(PacketType::Setup),
            // Malformed or malicious packets can carry any byte here
            value => Err(PacketError::UnknownPacketType { value }),
        }
    }
}
