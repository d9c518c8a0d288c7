//! Mock transport shared by the unit tests

use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use obidrfid_core::Request;
use obidrfid_transport::{RawReply, Result, TextReply, Transport};

mock! {
    pub Transport {}

    #[async_trait]
    impl Transport for Transport {
        async fn connect(&mut self, address: &str, port: u16) -> Result<i32>;
        async fn new_reader(&mut self, connection: i32) -> Result<i32>;
        async fn set_reader_param(&mut self, reader: i32, name: &str, value: &str) -> Result<i32>;
        async fn send_command(
            &mut self,
            reader: i32,
            request: &Request,
            timeout: Duration,
        ) -> Result<RawReply>;
        async fn status_text(&mut self, code: i32) -> Result<TextReply>;
        async fn error_text(&mut self, code: i32) -> Result<TextReply>;
        async fn disconnect(&mut self, reader: i32, connection: i32) -> Result<()>;
        fn is_connected(&self) -> bool;
        fn remote_addr(&self) -> String;
    }
}

/// Mock that accepts `connect` with connection 1, reader 2 and a successful negotiation
pub fn connectable() -> MockTransport {
    let mut transport = MockTransport::new();
    transport.expect_connect().times(1).returning(|_, _| Ok(1));
    transport.expect_new_reader().times(1).returning(|_| Ok(2));
    transport
        .expect_set_reader_param()
        .times(1)
        .returning(|_, _, _| Ok(0));
    transport.expect_remote_addr().return_const("10.0.0.10:10001".to_string());
    transport
}
