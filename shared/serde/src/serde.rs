use crate::{ByteReader, ByteWriter, SerdeErr};

/// A type with a fixed, platform-independent byte layout
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter);

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    fn byte_length(&self) -> usize;
}

/// Implemented by types whose byte length never depends on their value
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}

impl Serde for u8 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u8()
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for u8 {
    fn const_byte_length() -> usize {
        1
    }
}

impl Serde for u16 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u16()
    }

    fn byte_length(&self) -> usize {
        2
    }
}

impl ConstByteLength for u16 {
    fn const_byte_length() -> usize {
        2
    }
}

impl Serde for u32 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u32()
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl ConstByteLength for u32 {
    fn const_byte_length() -> usize {
        4
    }
}

impl Serde for i32 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_i32()
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl ConstByteLength for i32 {
    fn const_byte_length() -> usize {
        4
    }
}

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let offset = reader.offset();
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SerdeErr::InvalidBool { offset, value }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}
