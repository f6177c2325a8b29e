/// Growable little-endian byte writer.
///
/// Values are appended back-to-back with no alignment padding, so the length
/// of the output is exactly the sum of the lengths of the written values.
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Overwrites two bytes at `offset` with `value`, used to back-patch
    /// length fields once the payload that follows them is known.
    /// Returns false if the range lies outside the written buffer.
    pub fn patch_u16(&mut self, offset: usize, value: u16) -> bool {
        let Some(slot) = self.buffer.get_mut(offset..offset + 2) else {
            return false;
        };
        slot.copy_from_slice(&value.to_le_bytes());
        true
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
