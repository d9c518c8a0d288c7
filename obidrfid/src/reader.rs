//! High-level reader interface

use bytes::Bytes;
use tracing::{debug, info, warn};

use obidrfid_core::codes::{errors, params};
use obidrfid_core::{
    codec, Command, ConnectionHandle, Outcome, ReaderHandle, Request, Session, SessionState,
};
use obidrfid_transport::{RawReply, TcpTransport, Transport};
use obidrfid_types::{ConfigBlock, InventoryResult, ReaderInfo};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::resolver::Resolver;

/// OBID RFID reader session
///
/// Owns one connection handle and one reader handle. Every operation takes
/// `&mut self`, so a session runs at most one command at a time; use one
/// `Reader` per physical reader for concurrent access.
///
/// Operations return an [`Outcome`]: `Success` carries the payload, while
/// `Status` and `Error` carry the reply code and its resolved text. `Err` is
/// reserved for failures that prevent a reply from being interpreted at all.
///
/// # Examples
///
/// ```no_run
/// use obidrfid::{Reader, ReaderConfig};
///
/// #[tokio::main]
/// async fn main() -> obidrfid::Result<()> {
///     let mut reader = Reader::new(ReaderConfig::default());
///     reader.connect("192.168.10.10", 10001).await?;
///
///     let inventory = reader.scan().await?;
///     for record in inventory.success_or_default() {
///         println!("{}", record);
///     }
///
///     reader.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Reader {
    transport: Box<dyn Transport>,
    session: Session,
    config: ReaderConfig,
}

impl Reader {
    /// Create a reader speaking ISO-host frames over TCP
    pub fn new(config: ReaderConfig) -> Self {
        let transport = TcpTransport::new().with_connect_timeout(config.connect_timeout);
        Self::with_transport(Box::new(transport), config)
    }

    /// Create a reader over any transport
    pub fn with_transport(transport: Box<dyn Transport>, config: ReaderConfig) -> Self {
        Self {
            transport,
            session: Session::new(),
            config,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Shared view of the session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Open the transport and bind a reader (Disconnected → Connected/Ready)
    ///
    /// The `FrameSupport` negotiation that follows never fails the call; when
    /// the reader refuses it the session stays `Connected` and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionFailed`] if the transport cannot open the stream or
    ///   the connection handle is not positive (no reader handle is requested)
    /// - [`Error::ReaderInitFailed`] if the reader handle is not positive; the
    ///   connection is released and the session stays `Disconnected`
    pub async fn connect(&mut self, address: &str, port: u16) -> Result<()> {
        if self.session.is_connected() {
            return Err(obidrfid_transport::Error::AlreadyConnected.into());
        }

        info!("Connecting to {}:{}...", address, port);

        let raw = match self.transport.connect(address, port).await {
            Ok(raw) => raw,
            Err(e) => {
                return Err(Error::ConnectionFailed {
                    address: address.to_string(),
                    port,
                    code: errors::CONNECT_FAILED,
                    source: Some(e),
                });
            }
        };
        let connection = ConnectionHandle::from_raw(raw).ok_or_else(|| Error::ConnectionFailed {
            address: address.to_string(),
            port,
            code: raw,
            source: None,
        })?;

        let raw = self.transport.new_reader(connection.raw()).await?;
        let Some(reader) = ReaderHandle::from_raw(raw) else {
            if let Err(e) = self.transport.disconnect(0, connection.raw()).await {
                warn!("Failed to release {}: {}", connection, e);
            }
            return Err(Error::ReaderInitFailed { code: raw });
        };

        self.session.bind(connection, reader)?;
        self.negotiate(reader).await;

        info!(
            "Connected to {}:{} ({}, {}, state={:?})",
            address,
            port,
            connection,
            reader,
            self.session.state()
        );

        Ok(())
    }

    /// Release both handles (any state → Disconnected)
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some((connection, reader)) = self.session.close() else {
            return Ok(());
        };

        info!("Disconnecting ({}, {})...", connection, reader);

        self.transport.disconnect(reader.raw(), connection.raw()).await?;

        info!("Disconnected");
        Ok(())
    }

    /// Run one inventory
    ///
    /// `Success` with an empty result means no tag was in range; a reader
    /// status such as "no transponder" comes back as `Outcome::Status`.
    pub async fn scan(&mut self) -> Result<Outcome<InventoryResult>> {
        let reply = self
            .exchange(Command::IsoCommand, codec::encode_inventory_request())
            .await?;

        let outcome = Outcome::from_code(reply.status, || {
            codec::decode_inventory_response(&reply.data, reply.length).map(InventoryResult::from)
        })?;

        if let Outcome::Success(inventory) = &outcome {
            debug!("Inventory: {} transponder(s)", inventory.len());
        }

        self.finish(Command::IsoCommand, outcome).await
    }

    /// Read the reader information block
    pub async fn read_info(&mut self) -> Result<Outcome<ReaderInfo>> {
        let reply = self
            .exchange(Command::ReaderInfo, codec::encode_reader_info_request())
            .await?;

        let outcome =
            Outcome::from_code(reply.status, || codec::decode_reader_info(reply.payload()))?;

        self.finish(Command::ReaderInfo, outcome).await
    }

    /// Read the 14-byte LAN configuration block
    pub async fn read_lan_config(&mut self) -> Result<Outcome<ConfigBlock>> {
        let data = codec::encode_read_config_request(self.config.config_block_index);
        let reply = self.exchange(Command::ReadConfig, data).await?;

        let outcome = Outcome::from_code(reply.status, || {
            codec::decode_config_block(&reply.data, reply.length)
        })?;

        self.finish(Command::ReadConfig, outcome).await
    }

    /// Write `block` back with its IP replaced by `new_ip`
    ///
    /// Returns the block as written. The change sits in the reader's EEPROM
    /// until [`system_reset`](Self::system_reset).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `new_ip` holds exactly four values
    /// in `0..=255`; nothing is sent in that case.
    pub async fn write_lan_config(
        &mut self,
        block: &ConfigBlock,
        new_ip: &[u32],
    ) -> Result<Outcome<ConfigBlock>> {
        let updated = codec::apply_ip_to_config_block(block.as_bytes(), new_ip)?;

        debug!("Writing LAN configuration: {}", updated);

        let data = codec::encode_write_config_request(self.config.config_block_index, &updated);
        let reply = self.exchange(Command::WriteConfig, data).await?;

        let outcome = Outcome::from_code(reply.status, || Ok(updated))?;
        self.finish(Command::WriteConfig, outcome).await
    }

    /// Restart the reader, committing pending configuration writes
    ///
    /// The session stays bound. If the IP was just changed, disconnect and
    /// connect again at the new address.
    pub async fn system_reset(&mut self) -> Result<Outcome<()>> {
        warn!("Resetting reader...");

        let reply = self.exchange(Command::SystemReset, Bytes::new()).await?;

        let outcome = Outcome::from_code(reply.status, || Ok(()))?;
        self.finish(Command::SystemReset, outcome).await
    }

    // Helper methods

    async fn negotiate(&mut self, reader: ReaderHandle) {
        let value = self.config.frame_support.param_value();

        let code = match self
            .transport
            .set_reader_param(reader.raw(), params::FRAME_SUPPORT, value)
            .await
        {
            Ok(code) => code,
            Err(e) => {
                warn!("{}={} negotiation failed: {}", params::FRAME_SUPPORT, value, e);
                return;
            }
        };

        if code == 0 {
            if let Err(e) = self.session.mark_ready() {
                warn!("Cannot mark session ready: {}", e);
            }
            return;
        }

        let text = Resolver::new(&mut *self.transport)
            .text(code)
            .await
            .ok()
            .flatten();

        warn!(
            "{}={} refused (code {}: {})",
            params::FRAME_SUPPORT,
            value,
            code,
            text.as_deref().unwrap_or("no text")
        );
    }

    /// Send one command, closing the session if the link is lost
    async fn exchange(&mut self, command: Command, data: Bytes) -> Result<RawReply> {
        let reader = self.session.reader_handle()?;
        let request = Request::with_data(command, self.config.bus_address, data);

        if command.is_write() {
            info!("Sending {} to {}", command, reader);
        }
        debug!("Sending {:?}", request);

        let reply = match self
            .transport
            .send_command(reader.raw(), &request, self.config.command_timeout)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Link lost during {}: {}", command, e);
                if let Some((connection, reader)) = self.session.close() {
                    let released = self.transport.disconnect(reader.raw(), connection.raw()).await;
                    if let Err(e) = released {
                        warn!("Failed to release {}: {}", connection, e);
                    }
                }
                return Err(e.into());
            }
        };

        debug!("{} -> status {} ({} bytes)", command, reply.status, reply.length);

        Ok(reply)
    }

    /// Resolve text for non-success outcomes and log them
    async fn finish<T>(&mut self, command: Command, outcome: Outcome<T>) -> Result<Outcome<T>> {
        let outcome = Resolver::new(&mut *self.transport).refine(outcome).await?;

        if !outcome.is_success() {
            warn!("{} returned {}", command, outcome);
        }

        Ok(outcome)
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        if self.session.is_connected() {
            warn!("Reader dropped while still connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connectable, MockTransport};
    use mockall::predicate::eq;
    use obidrfid_transport::TextReply;
    use obidrfid_types::TransponderRecord;
    use pretty_assertions::assert_eq;

    fn reader(transport: MockTransport) -> Reader {
        Reader::with_transport(Box::new(transport), ReaderConfig::default())
    }

    async fn connected(transport: MockTransport) -> Reader {
        let mut reader = reader(transport);
        reader.connect("10.0.0.10", 10001).await.unwrap();
        reader
    }

    fn inventory_reply(records: &[&[u8; 20]]) -> RawReply {
        let mut data = vec![0x00, records.len() as u8];
        for record in records {
            data.extend_from_slice(*record);
        }
        RawReply::new(0, data)
    }

    #[test]
    fn test_reader_create() {
        let reader = Reader::new(ReaderConfig::default());
        assert!(!reader.is_connected());
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_ready() {
        let mut transport = MockTransport::new();
        transport
            .expect_connect()
            .withf(|address, port| address == "10.0.0.10" && *port == 10001)
            .times(1)
            .returning(|_, _| Ok(3));
        transport
            .expect_new_reader()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(4));
        transport
            .expect_set_reader_param()
            .withf(|reader, name, value| {
                *reader == 4 && name == "FrameSupport" && value == "Advanced"
            })
            .times(1)
            .returning(|_, _, _| Ok(0));
        transport.expect_disconnect().with(eq(4), eq(3)).times(1).returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        assert_eq!(reader.state(), SessionState::Ready);

        reader.disconnect().await.unwrap();
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_zero_handle_fails_without_reader() {
        let mut transport = MockTransport::new();
        transport.expect_connect().times(1).returning(|_, _| Ok(0));
        transport.expect_new_reader().times(0);

        let mut reader = reader(transport);
        let result = reader.connect("10.0.0.10", 10001).await;

        assert!(matches!(
            result,
            Err(Error::ConnectionFailed { code: 0, port: 10001, .. })
        ));
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_transport_error_is_connection_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_connect()
            .times(1)
            .returning(|_, _| {
                Err(obidrfid_transport::Error::InvalidAddress("reader.invalid".into()))
            });
        transport.expect_new_reader().times(0);

        let mut reader = reader(transport);
        let result = reader.connect("reader.invalid", 10001).await;

        match result {
            Err(Error::ConnectionFailed { code, source, .. }) => {
                assert_eq!(code, errors::CONNECT_FAILED);
                assert!(matches!(source, Some(obidrfid_transport::Error::InvalidAddress(_))));
            }
            other => panic!("Expected ConnectionFailed, got {:?}", other),
        }
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_reader_init_failure_releases_connection() {
        let mut transport = MockTransport::new();
        transport.expect_connect().times(1).returning(|_, _| Ok(1));
        transport.expect_new_reader().times(1).returning(|_| Ok(-5));
        transport.expect_set_reader_param().times(0);
        transport.expect_disconnect().with(eq(0), eq(1)).times(1).returning(|_, _| Ok(()));

        let mut reader = reader(transport);
        let result = reader.connect("10.0.0.10", 10001).await;

        assert!(matches!(result, Err(Error::ReaderInitFailed { code: -5 })));
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_negotiation_failure_stays_connected() {
        let mut transport = MockTransport::new();
        transport.expect_connect().returning(|_, _| Ok(1));
        transport.expect_new_reader().returning(|_| Ok(2));
        transport
            .expect_set_reader_param()
            .times(1)
            .returning(|_, _, _| Ok(errors::INVALID_PARAMETER));
        transport
            .expect_error_text()
            .with(eq(errors::INVALID_PARAMETER))
            .times(1)
            .returning(|_| Ok(TextReply::ok("Unsupported reader parameter")));
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Ok(inventory_reply(&[])));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        assert_eq!(reader.state(), SessionState::Connected);

        // Still usable
        let outcome = reader.scan().await.unwrap();
        assert_eq!(outcome, Outcome::Success(InventoryResult::default()));

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_commands_before_connect() {
        let mut transport = MockTransport::new();
        transport.expect_send_command().times(0);

        let mut reader = reader(transport);

        assert!(matches!(reader.scan().await, Err(Error::NotConnected)));
        assert!(matches!(reader.read_info().await, Err(Error::NotConnected)));
        assert!(matches!(reader.read_lan_config().await, Err(Error::NotConnected)));
        assert!(matches!(reader.system_reset().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_scan_one_record() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .withf(|reader, request, _| {
                *reader == 2
                    && request.command == Command::IsoCommand
                    && request.bus_address == 255
                    && request.data.as_ref() == [0x01, 0x00]
            })
            .times(1)
            .returning(|_, _, _| Ok(inventory_reply(&[b"TYDS1234567890123456"])));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let outcome = reader.scan().await.unwrap();

        let inventory = outcome.success().unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(
            inventory.records()[0],
            TransponderRecord::new("TY", "DS", "1234567890123456")
        );

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_status_is_distinct_from_empty() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Ok(RawReply::failed(5)));
        transport
            .expect_status_text()
            .with(eq(5))
            .times(1)
            .returning(|_| Ok(TextReply::ok("Wrong Transponder Type")));
        transport.expect_error_text().times(0);
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let outcome = reader.scan().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Status {
                code: 5,
                text: Some("Wrong Transponder Type".into())
            }
        );
        assert_ne!(outcome, Outcome::Success(InventoryResult::default()));
        assert!(outcome.success_or_default().is_empty());

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_error_outcome_with_failed_lookup() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Ok(RawReply::failed(errors::TIMEOUT)));
        transport
            .expect_error_text()
            .times(1)
            .returning(|_| Ok(TextReply::failed(errors::UNKNOWN_CODE)));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let outcome = reader.read_info().await.unwrap();

        assert_eq!(outcome, Outcome::Error { code: errors::TIMEOUT, text: None });
        // Session survives a fatal reply
        assert_eq!(reader.state(), SessionState::Ready);

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_decode_error() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Ok(inventory_reply(&[b"TY\xFF\xFE1234567890123456"])));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let result = reader.scan().await;

        assert!(matches!(result, Err(Error::Decode(_))));
        assert!(reader.is_connected());

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_info() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .withf(|_, request, _| request.command == Command::ReaderInfo)
            .times(1)
            .returning(|_, _, _| {
                let mut data = vec![0u8; 300];
                data[4] = 0x4C;
                Ok(RawReply::new(0, data))
            });
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let info = reader.read_info().await.unwrap().success().unwrap();

        assert_eq!(info.reader_type, 0x4C);
        assert_eq!(info.raw.len(), 300);

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_lan_config() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .withf(|_, request, _| {
                request.command == Command::ReadConfig && request.data.as_ref() == [168]
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(RawReply::new(0, vec![10, 0, 0, 10, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))
            });
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let block = reader.read_lan_config().await.unwrap().success().unwrap();

        assert_eq!(block.ip().octets(), [10, 0, 0, 10]);
        assert_eq!(block.reserved(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_lan_config() {
        let mut expected = vec![168, 192, 168, 1, 5];
        expected.extend_from_slice(&[0; 10]);

        let mut transport = connectable();
        transport
            .expect_send_command()
            .withf(move |_, request, _| {
                request.command == Command::WriteConfig
                    && request.data.as_ref() == expected.as_slice()
            })
            .times(1)
            .returning(|_, _, _| Ok(RawReply::new(0, Bytes::new())));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;

        let mut bytes = [0u8; 14];
        bytes[0] = 1;
        let block = ConfigBlock::new(bytes);

        let written = reader
            .write_lan_config(&block, &[192, 168, 1, 5])
            .await
            .unwrap()
            .success()
            .unwrap();

        let mut expected_block = [0u8; 14];
        expected_block[..4].copy_from_slice(&[192, 168, 1, 5]);
        assert_eq!(written.as_bytes(), &expected_block);

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_lan_config_invalid_ip() {
        let mut transport = connectable();
        transport.expect_send_command().times(0);
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let block = ConfigBlock::new([0; 14]);

        let result = reader.write_lan_config(&block, &[192, 168, 1]).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = reader.write_lan_config(&block, &[192, 168, 1, 256]).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_system_reset_keeps_session() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .withf(|_, request, _| {
                request.command == Command::SystemReset && request.data.is_empty()
            })
            .times(1)
            .returning(|_, _, _| Ok(RawReply::new(0, Bytes::new())));
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let outcome = reader.system_reset().await.unwrap();

        assert_eq!(outcome, Outcome::Success(()));
        assert!(reader.is_connected());

        reader.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_link_loss_disconnects() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Err(obidrfid_transport::Error::ConnectionClosed));
        transport.expect_disconnect().with(eq(2), eq(1)).times(1).returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let result = reader.scan().await;

        let err = result.unwrap_err();
        assert!(err.requires_reconnect());
        assert_eq!(reader.state(), SessionState::Disconnected);
        assert!(matches!(reader.scan().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_out_of_sync_reply_disconnects() {
        let mut transport = connectable();
        transport
            .expect_send_command()
            .times(1)
            .returning(|_, _, _| Err(obidrfid_transport::Error::OutOfSync("no reply".into())));
        transport
            .expect_disconnect()
            .with(eq(2), eq(1))
            .times(1)
            .returning(|_, _| Err(obidrfid_transport::Error::NotConnected));

        let mut reader = connected(transport).await;
        let err = reader.scan().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Transport(obidrfid_transport::Error::OutOfSync(_))
        ));
        assert!(err.requires_reconnect());
        assert_eq!(reader.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_twice() {
        let mut transport = connectable();
        transport.expect_disconnect().returning(|_, _| Ok(()));

        let mut reader = connected(transport).await;
        let result = reader.connect("10.0.0.10", 10001).await;

        assert!(matches!(
            result,
            Err(Error::Transport(obidrfid_transport::Error::AlreadyConnected))
        ));

        reader.disconnect().await.unwrap();
    }
}
