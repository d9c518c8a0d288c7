//! Transport layer for the OBID reader protocol
//!
//! The reader session depends only on the narrow [`Transport`] contract:
//! open a stream, bind a reader to it, exchange one command, look up
//! code texts. [`TcpTransport`] implements it natively over TCP.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use obidrfid_core::Request;

/// Raw result of one command exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    /// Reader status byte (`>= 0`) or transport error code (`< 0`)
    pub status: i32,

    /// Response buffer
    pub data: Bytes,

    /// Number of meaningful bytes in `data`
    pub length: usize,
}

impl RawReply {
    pub fn new(status: i32, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            status,
            length: data.len(),
            data,
        }
    }

    /// Reply carrying only a failure code
    pub fn failed(code: i32) -> Self {
        Self::new(code, Bytes::new())
    }

    /// Reply whose reported length differs from the buffer size
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Meaningful part of the buffer
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.length.min(self.data.len())]
    }
}

/// Result of a status/error text lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReply {
    /// `0` when the lookup succeeded
    pub code: i32,

    pub text: String,
}

impl TextReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            code: 0,
            text: text.into(),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            code,
            text: String::new(),
        }
    }
}

/// Transport trait for different reader links
///
/// Handles are raw integers; `0` or negative values returned from
/// [`connect`](Transport::connect) and [`new_reader`](Transport::new_reader)
/// are failure codes.
#[async_trait]
pub trait Transport: Send {
    /// Open a stream to the reader, returning a connection handle
    async fn connect(&mut self, address: &str, port: u16) -> Result<i32>;

    /// Bind a logical reader to an open connection
    async fn new_reader(&mut self, connection: i32) -> Result<i32>;

    /// Set a reader parameter, returning `0` on success
    async fn set_reader_param(&mut self, reader: i32, name: &str, value: &str) -> Result<i32>;

    /// Send one request and wait for its reply
    async fn send_command(
        &mut self,
        reader: i32,
        request: &Request,
        timeout: Duration,
    ) -> Result<RawReply>;

    /// Look up the text of a reader status code
    async fn status_text(&mut self, code: i32) -> Result<TextReply>;

    /// Look up the text of an error code
    async fn error_text(&mut self, code: i32) -> Result<TextReply>;

    /// Release the reader and close the connection
    async fn disconnect(&mut self, reader: i32, connection: i32) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
