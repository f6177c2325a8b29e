use thiserror::Error;

/// Errors raised while reading fixed-layout values out of a byte buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the value was complete
    #[error("Unexpected end of buffer: needed {needed} bytes at offset {offset}, only {remaining} remain")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A boolean byte held something other than 0 or 1
    #[error("Invalid boolean byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },
}
