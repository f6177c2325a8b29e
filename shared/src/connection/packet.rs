use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::{
    connection::{
        error::PacketError,
        packet_header::{PacketHeader, PACKET_HEADER_LEN},
        packet_type::PacketType,
    },
    types::{PeerId, SequenceNumber},
};

/// A framed packet: header plus opaque payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(
        peer_id: PeerId,
        sequence: SequenceNumber,
        packet_type: PacketType,
        payload: Vec<u8>,
    ) -> Result<Self, PacketError> {
        let payload_len = u16::try_from(payload.len()).map_err(|_| PacketError::PayloadTooLarge {
            len: payload.len(),
            max: usize::from(u16::MAX),
        })?;
        Ok(Self {
            header: PacketHeader::new(peer_id, sequence, packet_type, payload_len),
            payload,
        })
    }

    pub fn packet_type(&self) -> PacketType {
        self.header.packet_type
    }

    pub fn sequence(&self) -> SequenceNumber {
        self.header.sequence
    }

    pub fn byte_length(&self) -> usize {
        PACKET_HEADER_LEN + self.payload.len()
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        self.header.write(writer);
        writer.write_bytes(&self.payload);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.byte_length());
        self.write(&mut writer);
        writer.to_bytes()
    }

    pub fn read(reader: &mut ByteReader) -> Result<Self, PacketError> {
        let header = PacketHeader::read(reader)?;
        let declared = usize::from(header.payload_len);
        let available = reader.remaining();
        if declared > available {
            return Err(PacketError::PayloadLengthMismatch {
                declared,
                available,
            });
        }
        let payload = reader.read_bytes(declared)?.to_vec();
        Ok(Self { header, payload })
    }
}

/// Splits a datagram into its back-to-back packets.
///
/// Framing cannot be recovered past a bad header, so the first error ends
/// the split; packets parsed before it are still returned.
pub fn split_datagram(bytes: &[u8]) -> (Vec<Packet>, Option<PacketError>) {
    let mut reader = ByteReader::new(bytes);
    let mut packets = Vec::new();
    while !reader.is_empty() {
        match Packet::read(&mut reader) {
            Ok(packet) => packets.push(packet),
            Err(error) => return (packets, Some(error)),
        }
    }
    (packets, None)
}

/// Encodes a batch of acknowledged sequence numbers as an ACK payload
pub fn encode_ack_payload(sequences: &[SequenceNumber]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(sequences.len() * 4);
    for sequence in sequences {
        sequence.ser(&mut writer);
    }
    writer.to_bytes()
}

pub fn decode_ack_payload(payload: &[u8]) -> Result<Vec<SequenceNumber>, PacketError> {
    if payload.len() % 4 != 0 {
        return Err(PacketError::MisalignedAck { len: payload.len() });
    }
    let mut reader = ByteReader::new(payload);
    let mut output = Vec::with_capacity(payload.len() / 4);
    while !reader.is_empty() {
        output.push(SequenceNumber::de(&mut reader)?);
    }
    Ok(output)
}
