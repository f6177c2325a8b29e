use lockstep_serde::{ByteReader, ByteWriter, Serde};

use crate::handshake::{HandshakeError, SetupField};

/// Wire protocol revision; peers on different revisions never start a session
pub const PROTOCOL_VERSION: u16 = 1;

const SETUP_INFO_LEN: usize = 2 + 4 + 2 + 2 + 2 + 2;

/// Everything peers must agree on before frame 0
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetupInfo {
    pub protocol_version: u16,
    pub content_checksum: u32,
    pub lookahead: u16,
    pub frame_rate: u16,
    /// Upper bound for MaxAhead. Peers bounding it differently would
    /// schedule commands arbitrarily far apart.
    pub max_lookahead: u16,
    pub safety_margin: u16,
}

impl SetupInfo {
    pub fn new(content_checksum: u32, lookahead: u16, frame_rate: u16) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            content_checksum,
            lookahead,
            frame_rate,
            max_lookahead: lookahead,
            safety_margin: 0,
        }
    }

    /// Sets the MaxAhead bounds peers must share
    pub fn with_max_ahead(mut self, max_lookahead: u16, safety_margin: u16) -> Self {
        self.max_lookahead = max_lookahead;
        self.safety_margin = safety_margin;
        self
    }

    /// The first field on which `remote` differs from `self`
    pub fn first_difference(&self, remote: &SetupInfo) -> Option<(SetupField, u32, u32)> {
        let fields = [
            (
                SetupField::ProtocolVersion,
                u32::from(self.protocol_version),
                u32::from(remote.protocol_version),
            ),
            (
                SetupField::ContentChecksum,
                self.content_checksum,
                remote.content_checksum,
            ),
            (
                SetupField::Lookahead,
                u32::from(self.lookahead),
                u32::from(remote.lookahead),
            ),
            (
                SetupField::FrameRate,
                u32::from(self.frame_rate),
                u32::from(remote.frame_rate),
            ),
            (
                SetupField::MaxLookahead,
                u32::from(self.max_lookahead),
                u32::from(remote.max_lookahead),
            ),
            (
                SetupField::SafetyMargin,
                u32::from(self.safety_margin),
                u32::from(remote.safety_margin),
            ),
        ];
        fields.into_iter().find(|(_, local, remote)| local != remote)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(SETUP_INFO_LEN);
        self.protocol_version.ser(&mut writer);
        self.content_checksum.ser(&mut writer);
        self.lookahead.ser(&mut writer);
        self.frame_rate.ser(&mut writer);
        self.max_lookahead.ser(&mut writer);
        self.safety_margin.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, HandshakeError> {
        let malformed = HandshakeError::MalformedSetup {
            len: bytes.len(),
            expected: SETUP_INFO_LEN,
        };
        if bytes.len() != SETUP_INFO_LEN {
            return Err(malformed);
        }
        let mut reader = ByteReader::new(bytes);
        let read = |reader: &mut ByteReader| -> Result<Self, lockstep_serde::SerdeErr> {
            Ok(Self {
                protocol_version: u16::de(reader)?,
                content_checksum: u32::de(reader)?,
                lookahead: u16::de(reader)?,
                frame_rate: u16::de(reader)?,
                max_lookahead: u16::de(reader)?,
                safety_margin: u16::de(reader)?,
            })
        };
        read(&mut reader).map_err(|_| malformed)
    }
}
