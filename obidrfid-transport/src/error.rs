//! Transport errors
//!
//! Only link-level failures are errors here. Reply-level problems
//! (timeouts, bad CRC, unknown handles) travel as negative reply codes.

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    /// Reply stream lost its frame boundary; the connection was closed
    #[error("Reply stream out of sync: {0}")]
    OutOfSync(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Protocol error: {0}")]
    Core(#[from] obidrfid_core::Error),
}
