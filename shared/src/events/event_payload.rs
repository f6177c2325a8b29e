use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::{
    events::{event_kind::MAX_MESSAGE_LEN, EventKind, MalformedEvent},
    types::FrameNumber,
};

/// Kind-specific body of an Event.
///
/// All coordinates and identifiers are integers so the simulation never has
/// to interpret floating point data coming off the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventPayload {
    NoCommand,
    Ally { house: u8 },
    Move { unit: u32, destination: u32 },
    Attack { unit: u32, target: u32 },
    Idle { unit: u32 },
    Scatter { unit: u32 },
    Deploy { unit: u32 },
    Place { object_kind: u8, object_id: u16, cell: u32 },
    Produce { object_kind: u8, object_id: u16 },
    Suspend { object_kind: u8, object_id: u16 },
    Abandon { object_kind: u8, object_id: u16 },
    Sell { building: u32 },
    Repair { building: u32 },
    Primary { building: u32 },
    Special { flags: u32 },
    GameSpeed { speed: u8 },
    ResponseTime { frames: u8 },
    Timing { frame_rate: u16, max_ahead: u16 },
    Message { text: Vec<u8> },
    FrameInfo { frame: FrameNumber, fingerprint: u32 },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::NoCommand => EventKind::NoCommand,
            EventPayload::Ally { .. } => EventKind::Ally,
            EventPayload::Move { .. } => EventKind::Move,
            EventPayload::Attack { .. } => EventKind::Attack,
            EventPayload::Idle { .. } => EventKind::Idle,
            EventPayload::Scatter { .. } => EventKind::Scatter,
            EventPayload::Deploy { .. } => EventKind::Deploy,
            EventPayload::Place { .. } => EventKind::Place,
            EventPayload::Produce { .. } => EventKind::Produce,
            EventPayload::Suspend { .. } => EventKind::Suspend,
            EventPayload::Abandon { .. } => EventKind::Abandon,
            EventPayload::Sell { .. } => EventKind::Sell,
            EventPayload::Repair { .. } => EventKind::Repair,
            EventPayload::Primary { .. } => EventKind::Primary,
            EventPayload::Special { .. } => EventKind::Special,
            EventPayload::GameSpeed { .. } => EventKind::GameSpeed,
            EventPayload::ResponseTime { .. } => EventKind::ResponseTime,
            EventPayload::Timing { .. } => EventKind::Timing,
            EventPayload::Message { .. } => EventKind::Message,
            EventPayload::FrameInfo { .. } => EventKind::FrameInfo,
        }
    }

    /// Encoded size of this payload, excluding the event header
    pub fn byte_length(&self) -> usize {
        match self {
            EventPayload::Message { text } => 1 + text.len(),
            other => other.kind().max_payload_len(),
        }
    }

    pub(crate) fn ser(&self, writer: &mut ByteWriter) {
        match self {
            EventPayload::NoCommand => {}
            EventPayload::Ally { house } => house.ser(writer),
            EventPayload::Move { unit, destination } => {
                unit.ser(writer);
                destination.ser(writer);
            }
            EventPayload::Attack { unit, target } => {
                unit.ser(writer);
                target.ser(writer);
            }
            EventPayload::Idle { unit }
            | EventPayload::Scatter { unit }
            | EventPayload::Deploy { unit } => unit.ser(writer),
            EventPayload::Place {
                object_kind,
                object_id,
                cell,
            } => {
                object_kind.ser(writer);
                object_id.ser(writer);
                cell.ser(writer);
            }
            EventPayload::Produce {
                object_kind,
                object_id,
            }
            | EventPayload::Suspend {
                object_kind,
                object_id,
            }
            | EventPayload::Abandon {
                object_kind,
                object_id,
            } => {
                object_kind.ser(writer);
                object_id.ser(writer);
            }
            EventPayload::Sell { building }
            | EventPayload::Repair { building }
            | EventPayload::Primary { building } => building.ser(writer),
            EventPayload::Special { flags } => flags.ser(writer),
            EventPayload::GameSpeed { speed } => speed.ser(writer),
            EventPayload::ResponseTime { frames } => frames.ser(writer),
            EventPayload::Timing {
                frame_rate,
                max_ahead,
            } => {
                frame_rate.ser(writer);
                max_ahead.ser(writer);
            }
            EventPayload::Message { text } => {
                // length was validated against MAX_MESSAGE_LEN at authoring time
                (text.len() as u8).ser(writer);
                writer.write_bytes(text);
            }
            EventPayload::FrameInfo { frame, fingerprint } => {
                frame.ser(writer);
                fingerprint.ser(writer);
            }
        }
    }

    pub(crate) fn de(kind: EventKind, reader: &mut ByteReader) -> Result<Self, MalformedEvent> {
        let payload = match kind {
            EventKind::NoCommand => EventPayload::NoCommand,
            EventKind::Ally => EventPayload::Ally {
                house: u8::de(reader)?,
            },
            EventKind::Move => EventPayload::Move {
                unit: u32::de(reader)?,
                destination: u32::de(reader)?,
            },
            EventKind::Attack => EventPayload::Attack {
                unit: u32::de(reader)?,
                target: u32::de(reader)?,
            },
            EventKind::Idle => EventPayload::Idle {
                unit: u32::de(reader)?,
            },
            EventKind::Scatter => EventPayload::Scatter {
                unit: u32::de(reader)?,
            },
            EventKind::Deploy => EventPayload::Deploy {
                unit: u32::de(reader)?,
            },
            EventKind::Place => EventPayload::Place {
                object_kind: u8::de(reader)?,
                object_id: u16::de(reader)?,
                cell: u32::de(reader)?,
            },
            EventKind::Produce => EventPayload::Produce {
                object_kind: u8::de(reader)?,
                object_id: u16::de(reader)?,
            },
            EventKind::Suspend => EventPayload::Suspend {
                object_kind: u8::de(reader)?,
                object_id: u16::de(reader)?,
            },
            EventKind::Abandon => EventPayload::Abandon {
                object_kind: u8::de(reader)?,
                object_id: u16::de(reader)?,
            },
            EventKind::Sell => EventPayload::Sell {
                building: u32::de(reader)?,
            },
            EventKind::Repair => EventPayload::Repair {
                building: u32::de(reader)?,
            },
            EventKind::Primary => EventPayload::Primary {
                building: u32::de(reader)?,
            },
            EventKind::Special => EventPayload::Special {
                flags: u32::de(reader)?,
            },
            EventKind::GameSpeed => EventPayload::GameSpeed {
                speed: u8::de(reader)?,
            },
            EventKind::ResponseTime => EventPayload::ResponseTime {
                frames: u8::de(reader)?,
            },
            EventKind::Timing => EventPayload::Timing {
                frame_rate: u16::de(reader)?,
                max_ahead: u16::de(reader)?,
            },
            EventKind::Message => {
                let len = usize::from(u8::de(reader)?);
                if len > MAX_MESSAGE_LEN {
                    return Err(MalformedEvent::LengthOutOfRange {
                        kind,
                        len,
                        max: MAX_MESSAGE_LEN,
                    });
                }
                EventPayload::Message {
                    text: reader.read_bytes(len)?.to_vec(),
                }
            }
            EventKind::FrameInfo => EventPayload::FrameInfo {
                frame: u32::de(reader)?,
                fingerprint: u32::de(reader)?,
            },
        };
        Ok(payload)
    }
}
