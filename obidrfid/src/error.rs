//! High-level error types

use obidrfid_core::Outcome;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport could not open the stream or returned a non-positive handle
    #[error("Connection to {address}:{port} failed (code {code})")]
    ConnectionFailed {
        address: String,
        port: u16,
        code: i32,
        #[source]
        source: Option<obidrfid_transport::Error>,
    },

    /// Transport returned a non-positive reader handle
    #[error("Reader initialisation failed (code {code})")]
    ReaderInitFailed { code: i32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Non-fatal reader status; the caller decides whether to retry
    #[error("Reader status {code}{}", text_suffix(.text))]
    ProtocolStatus { code: i32, text: Option<String> },

    /// Fatal for this call; the session stays connected
    #[error("Protocol error {code}{}", text_suffix(.text))]
    ProtocolError { code: i32, text: Option<String> },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Reader not connected")]
    NotConnected,

    #[error("Core protocol error: {0}")]
    Core(obidrfid_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] obidrfid_transport::Error),
}

fn text_suffix(text: &Option<String>) -> String {
    text.as_deref()
        .map(|text| format!(": {}", text))
        .unwrap_or_default()
}

impl From<obidrfid_core::Error> for Error {
    fn from(err: obidrfid_core::Error) -> Self {
        match err {
            obidrfid_core::Error::InvalidArgument(msg) => Self::InvalidArgument(msg),
            obidrfid_core::Error::Decode(msg) => Self::Decode(msg),
            obidrfid_core::Error::SessionNotInitialized => Self::NotConnected,
            other => Self::Core(other),
        }
    }
}

impl Error {
    /// Check if the session is still usable after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::ProtocolStatus { .. }
                | Self::ProtocolError { .. }
                | Self::Decode(_)
        )
    }

    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::ReaderInitFailed { .. } => true,
            Self::NotConnected => true,
            Self::Transport(_) => true,
            Self::Core(err) => err.requires_reconnect(),
            _ => false,
        }
    }
}

/// Turn Status/Error outcomes into [`Error`] values
pub trait OutcomeExt<T> {
    /// `Success(v)` becomes `Ok(v)`; Status and Error become
    /// [`Error::ProtocolStatus`] and [`Error::ProtocolError`]
    fn into_result(self) -> Result<T>;
}

impl<T> OutcomeExt<T> for Outcome<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Status { code, text } => Err(Error::ProtocolStatus { code, text }),
            Outcome::Error { code, text } => Err(Error::ProtocolError { code, text }),
        }
    }
}
