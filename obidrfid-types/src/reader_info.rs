//! Reader information structures

use std::fmt;

use bytes::Bytes;

/// Reader information returned by the reader-info command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderInfo {
    /// Descriptive byte (offset 4 of the info buffer)
    pub reader_type: u8,

    /// Complete info buffer as received
    pub raw: Bytes,
}

impl ReaderInfo {
    pub fn new(reader_type: u8, raw: impl Into<Bytes>) -> Self {
        Self {
            reader_type,
            raw: raw.into(),
        }
    }
}

impl fmt::Display for ReaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reader[type: {}]", self.reader_type)
    }
}
