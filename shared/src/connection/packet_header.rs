use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::{
    connection::{error::PacketError, packet_type::PacketType},
    types::{PeerId, SequenceNumber},
};

/// Size of the fixed header preceding every payload
pub const PACKET_HEADER_LEN: usize = 1 + 4 + 1 + 2;

/// The fixed little-endian header carried by every packet
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub peer_id: PeerId,
    pub sequence: SequenceNumber,
    pub packet_type: PacketType,
    pub payload_len: u16,
}

impl PacketHeader {
    pub fn new(
        peer_id: PeerId,
        sequence: SequenceNumber,
        packet_type: PacketType,
        payload_len: u16,
    ) -> Self {
        Self {
            peer_id,
            sequence,
            packet_type,
            payload_len,
        }
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        self.peer_id.ser(writer);
        self.sequence.ser(writer);
        self.packet_type.write(writer);
        self.payload_len.ser(writer);
    }

    pub fn read(reader: &mut ByteReader) -> Result<Self, PacketError> {
        let peer_id = PeerId::de(reader)?;
        let sequence = SequenceNumber::de(reader)?;
        let packet_type = PacketType::read(reader)?;
        let payload_len = u16::de(reader)?;
        Ok(Self {
            peer_id,
            sequence,
            packet_type,
            payload_len,
        })
    }
}
