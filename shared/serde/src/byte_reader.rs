use crate::SerdeErr;

/// Cursor over a borrowed byte buffer, reading little-endian values.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8, SerdeErr> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeErr> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeErr> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, SerdeErr> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrows the next `len` bytes and advances past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        self.take(len)
    }

    fn take(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.offset,
                needed: len,
                remaining,
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.buffer[start..self.offset])
    }
}
