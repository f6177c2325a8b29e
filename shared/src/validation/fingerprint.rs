use crc32fast::Hasher;

use crate::types::FrameNumber;

/// A 32-bit summary of post-execution simulation state for one frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub frame: FrameNumber,
    pub value: u32,
}

impl Fingerprint {
    pub fn new(frame: FrameNumber, value: u32) -> Self {
        Self { frame, value }
    }
}

/// Folds simulation state into a CRC-32.
///
/// Only integer writers are offered: floating point state must be
/// converted to fixed point before it is fingerprinted, otherwise two
/// platforms may disagree on the bits being folded.
pub struct FingerprintHasher {
    hasher: Hasher,
}

impl FingerprintHasher {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.hasher.update(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.hasher.update(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.hasher.update(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.hasher.update(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    pub fn finish(self) -> u32 {
        self.hasher.finalize()
    }
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of scenario/content data exchanged during session setup
pub fn content_checksum(content: &[u8]) -> u32 {
    crc32fast::hash(content)
}
