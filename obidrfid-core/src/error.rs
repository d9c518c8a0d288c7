//! Error types for obidrfid-core

/// Result type alias for obidrfid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// CRC verification failed
    #[error("CRC mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    CrcMismatch {
        expected: u16,
        received: u16,
    },

    /// Length field disagrees with the received byte count
    #[error("Frame length mismatch: header declares {declared} bytes, got {actual} bytes")]
    FrameLengthMismatch {
        declared: usize,
        actual: usize,
    },

    /// Advanced frame does not start with STX
    #[error("Unexpected start byte: 0x{0:02X}")]
    UnexpectedStartByte(u8),

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Payload does not fit the frame's length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Session not initialized
    #[error("Session not initialized - connect to reader first")]
    SessionNotInitialized,

    /// Caller passed a malformed argument (IP octets, buffer sizes)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reader reply could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<obidrfid_types::Error> for Error {
    fn from(err: obidrfid_types::Error) -> Self {
        match err {
            obidrfid_types::Error::Validation(msg) => Self::InvalidArgument(msg),
            obidrfid_types::Error::Parse(msg) => Self::Decode(msg),
        }
    }
}

impl Error {
    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::SessionNotInitialized | Self::InvalidSessionState(_)
        )
    }
}
