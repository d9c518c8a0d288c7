//! TCP transport
//!
//! Speaks the ISO-host frame protocol directly to the reader's LAN port.
//! One transport holds at most one connection and one reader binding.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use obidrfid_core::codes::{self, errors, params};
use obidrfid_core::{FrameFormat, Request, Response};

use crate::{error::*, RawReply, TextReply, Transport};

/// TCP transport for OBID readers
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connection: i32,
    reader: i32,
    next_handle: i32,
    frame_format: FrameFormat,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new() -> Self {
        Self {
            addr: String::new(),
            port: codes::DEFAULT_PORT,
            socket_addr: None,
            stream: None,
            connection: 0,
            reader: 0,
            next_handle: 1,
            frame_format: FrameFormat::Standard,
            connect_timeout: Duration::from_secs(codes::DEFAULT_CONNECT_TIMEOUT),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Frame format currently in use
    pub fn frame_format(&self) -> FrameFormat {
        self.frame_format
    }

    fn allocate_handle(&mut self) -> i32 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.checked_add(1).unwrap_or(1);
        handle
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.addr, self.port);

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .collect();

        let addr = addrs
            .first()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(*addr);
        Ok(*addr)
    }

    /// Close a stream whose framing can no longer be trusted
    async fn abandon_stream(&mut self, reason: String) -> Error {
        warn!("Dropping connection to {}: {}", self.remote_addr(), reason);

        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }

        Error::OutOfSync(reason)
    }

    /// Read one complete reply frame
    async fn read_frame(stream: &mut TcpStream, format: FrameFormat) -> Result<BytesMut> {
        let prefix_len = format.prefix_len();
        let mut buf = BytesMut::zeroed(prefix_len);

        stream.read_exact(&mut buf).await.map_err(read_error)?;

        let total = format.declared_len(&buf)?;
        if total < format.min_response_len() {
            return Err(obidrfid_core::Error::FrameTooShort {
                expected: format.min_response_len(),
                actual: total,
            }
            .into());
        }

        buf.resize(total, 0);
        stream.read_exact(&mut buf[prefix_len..]).await.map_err(read_error)?;

        Ok(buf)
    }
}

fn read_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, address: &str, port: u16) -> Result<i32> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        self.addr = address.to_string();
        self.port = port;
        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!("Connection to {} failed: {}", addr, e);
                return Ok(errors::CONNECT_FAILED);
            }
            Err(_) => {
                warn!("Connection to {} timed out", addr);
                return Ok(errors::TIMEOUT);
            }
        };

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        self.stream = Some(stream);
        self.connection = self.allocate_handle();

        debug!("Connected to {} (connection={})", addr, self.connection);

        Ok(self.connection)
    }

    async fn new_reader(&mut self, connection: i32) -> Result<i32> {
        if !self.is_connected() || connection != self.connection {
            warn!("new_reader on unknown connection {}", connection);
            return Ok(errors::UNKNOWN_HANDLE);
        }

        self.reader = self.allocate_handle();
        self.frame_format = FrameFormat::Standard;

        debug!("Reader {} bound to connection {}", self.reader, connection);

        Ok(self.reader)
    }

    async fn set_reader_param(&mut self, reader: i32, name: &str, value: &str) -> Result<i32> {
        if self.reader == 0 || reader != self.reader {
            return Ok(errors::UNKNOWN_HANDLE);
        }

        match (name, FrameFormat::from_param(value)) {
            (params::FRAME_SUPPORT, Some(format)) => {
                debug!("Frame format set to {:?}", format);
                self.frame_format = format;
                Ok(0)
            }
            _ => {
                warn!("Unsupported reader parameter {}={}", name, value);
                Ok(errors::INVALID_PARAMETER)
            }
        }
    }

    async fn send_command(
        &mut self,
        reader: i32,
        request: &Request,
        timeout_duration: Duration,
    ) -> Result<RawReply> {
        if self.reader == 0 || reader != self.reader {
            return Ok(RawReply::failed(errors::UNKNOWN_HANDLE));
        }

        let format = self.frame_format;
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let frame = match request.encode(format) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Cannot encode {:?}: {}", request, e);
                return Ok(RawReply::failed(errors::REQUEST_TOO_LARGE));
            }
        };

        trace!("Sending {} bytes: {}", frame.len(), hex::encode(&frame));

        stream.write_all(&frame).await?;
        stream.flush().await?;

        // A late or half-read reply would be taken for the next one
        let buf = match timeout(timeout_duration, Self::read_frame(stream, format)).await {
            Ok(Ok(buf)) => buf,
            Ok(Err(Error::Core(e))) => {
                let reason = format!("malformed reply to {}: {}", request.command, e);
                return Err(self.abandon_stream(reason).await);
            }
            Ok(Err(e)) => {
                self.stream = None;
                return Err(e);
            }
            Err(_) => {
                let reason =
                    format!("no reply to {} within {:?}", request.command, timeout_duration);
                return Err(self.abandon_stream(reason).await);
            }
        };

        trace!("Received {} bytes: {}", buf.len(), hex::encode(&buf));

        let response = match Response::decode(&buf, format) {
            Ok(response) => response,
            Err(e @ obidrfid_core::Error::CrcMismatch { .. }) => {
                warn!("Reply to {} failed CRC: {}", request.command, e);
                return Ok(RawReply::failed(errors::CRC_ERROR));
            }
            Err(e) => {
                warn!("Malformed reply to {}: {}", request.command, e);
                return Ok(RawReply::failed(errors::FRAME_ERROR));
            }
        };

        if response.command != request.command {
            warn!("Reply echoes {} for request {}", response.command, request.command);
            return Ok(RawReply::failed(errors::FRAME_ERROR));
        }

        Ok(RawReply::new(response.status as i32, response.data))
    }

    async fn status_text(&mut self, code: i32) -> Result<TextReply> {
        Ok(u8::try_from(code)
            .ok()
            .and_then(codes::status::text)
            .map(TextReply::ok)
            .unwrap_or_else(|| TextReply::failed(errors::UNKNOWN_CODE)))
    }

    async fn error_text(&mut self, code: i32) -> Result<TextReply> {
        Ok(codes::errors::text(code)
            .map(TextReply::ok)
            .unwrap_or_else(|| TextReply::failed(errors::UNKNOWN_CODE)))
    }

    async fn disconnect(&mut self, reader: i32, connection: i32) -> Result<()> {
        if reader != self.reader || connection != self.connection {
            warn!(
                "Disconnect with stale handles (reader={}, connection={})",
                reader, connection
            );
        }

        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            // Graceful shutdown
            let _ = stream.shutdown().await;
        }

        self.connection = 0;
        self.reader = 0;
        self.frame_format = FrameFormat::Standard;
        self.socket_addr = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport dropped while still connected");
        }
    }
}
