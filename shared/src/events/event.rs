use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::{
    events::{EventError, EventKind, EventPayload, MalformedEvent},
    types::{FrameNumber, PeerId},
};

/// Bytes preceding every payload: kind tag, origin peer, target frame
pub const EVENT_HEADER_LEN: usize = 1 + 1 + 4;

/// An immutable, typed command scheduled to execute on a specific frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    origin: PeerId,
    target_frame: FrameNumber,
    payload: EventPayload,
}

impl Event {
    /// Schedules a command `lookahead` frames after `authored_frame`.
    ///
    /// A lookahead of zero is refused: the authoring frame is already being
    /// executed by the time the command reaches other peers, so it could
    /// never land on the same frame everywhere.
    pub fn create(
        origin: PeerId,
        kind: EventKind,
        payload: EventPayload,
        authored_frame: FrameNumber,
        lookahead: u32,
    ) -> Result<Self, EventError> {
        let target_frame =
            authored_frame
                .checked_add(lookahead)
                .ok_or(EventError::FrameOverflow {
                    authored_frame,
                    lookahead,
                })?;
        Self::scheduled(origin, kind, payload, authored_frame, target_frame, lookahead)
    }

    /// Schedules a command on an explicit frame, which must be at least
    /// `min_lookahead` frames after `authored_frame`.
    pub fn scheduled(
        origin: PeerId,
        kind: EventKind,
        payload: EventPayload,
        authored_frame: FrameNumber,
        target_frame: FrameNumber,
        min_lookahead: u32,
    ) -> Result<Self, EventError> {
        let earliest_frame = authored_frame
            .checked_add(min_lookahead.max(1))
            .ok_or(EventError::FrameOverflow {
                authored_frame,
                lookahead: min_lookahead,
            })?;
        if target_frame < earliest_frame {
            return Err(EventError::LookaheadViolation {
                authored_frame,
                target_frame,
                earliest_frame,
            });
        }

        Self::check_payload(kind, &payload)?;

        Ok(Self {
            origin,
            target_frame,
            payload,
        })
    }

    /// Builds the heartbeat carrying the fingerprint of an executed frame.
    /// Heartbeats describe the past, so they bypass the lookahead rule.
    pub fn frame_info(origin: PeerId, frame: FrameNumber, fingerprint: u32) -> Self {
        Self {
            origin,
            target_frame: frame,
            payload: EventPayload::FrameInfo { frame, fingerprint },
        }
    }

    /// Builds the "nothing this frame" marker that fills a barrier slot.
    pub fn no_command(origin: PeerId, target_frame: FrameNumber) -> Self {
        Self {
            origin,
            target_frame,
            payload: EventPayload::NoCommand,
        }
    }

    fn check_payload(kind: EventKind, payload: &EventPayload) -> Result<(), EventError> {
        let payload_kind = payload.kind();
        if payload_kind != kind {
            return Err(EventError::KindMismatch { kind, payload_kind });
        }
        let size = payload.byte_length();
        let max = kind.max_payload_len();
        if size > max {
            return Err(EventError::PayloadTooLarge { kind, size, max });
        }
        Ok(())
    }

    pub fn origin(&self) -> PeerId {
        self.origin
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn target_frame(&self) -> FrameNumber {
        self.target_frame
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn is_game_visible(&self) -> bool {
        self.kind().is_game_visible()
    }

    pub fn byte_length(&self) -> usize {
        EVENT_HEADER_LEN + self.payload.byte_length()
    }

    pub fn ser(&self, writer: &mut ByteWriter) {
        self.kind().to_u8().ser(writer);
        self.origin.ser(writer);
        self.target_frame.ser(writer);
        self.payload.ser(writer);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, MalformedEvent> {
        let kind = EventKind::try_from(u8::de(reader)?)?;
        let origin = PeerId::de(reader)?;
        let target_frame = FrameNumber::de(reader)?;
        let payload = EventPayload::de(kind, reader)?;
        Ok(Self {
            origin,
            target_frame,
            payload,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.byte_length());
        self.ser(&mut writer);
        writer.to_bytes()
    }

    /// Decodes exactly one event; leftover bytes are an error
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedEvent> {
        let mut reader = ByteReader::new(bytes);
        let event = Self::de(&mut reader)?;
        if !reader.is_empty() {
            return Err(MalformedEvent::TrailingBytes {
                remaining: reader.remaining(),
            });
        }
        Ok(event)
    }

    /// Encodes a sequence of events back-to-back, as carried in one packet
    pub fn encode_all<'e>(events: impl IntoIterator<Item = &'e Event>) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        for event in events {
            event.ser(&mut writer);
        }
        writer.to_bytes()
    }

    /// Decodes a packet payload; one bad event rejects the whole payload
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Self>, MalformedEvent> {
        let mut reader = ByteReader::new(bytes);
        let mut output = Vec::new();
        while !reader.is_empty() {
            output.push(Self::de(&mut reader)?);
        }
        Ok(output)
    }
}
