//! Reader and polling configuration

use std::time::Duration;

use obidrfid_core::{codes, FrameFormat};

/// Settings for one reader session
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Reader LAN port
    pub port: u16,

    /// COM-ADR placed in every request frame
    pub bus_address: u8,

    /// Bound on each command round trip
    pub command_timeout: Duration,

    /// Bound on opening the TCP stream
    pub connect_timeout: Duration,

    /// Frame format requested through the `FrameSupport` parameter
    pub frame_support: FrameFormat,

    /// Block holding the LAN settings (EEPROM copy of block 40)
    pub config_block_index: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            port: codes::DEFAULT_PORT,
            bus_address: codes::DEFAULT_BUS_ADDRESS,
            command_timeout: Duration::from_secs(codes::DEFAULT_TIMEOUT),
            connect_timeout: Duration::from_secs(codes::DEFAULT_CONNECT_TIMEOUT),
            frame_support: FrameFormat::Advanced,
            config_block_index: codes::LAN_CONFIG_BLOCK,
        }
    }
}

impl ReaderConfig {
    /// Create a new config builder
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }
}

/// Builder for ReaderConfig
#[derive(Default)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn bus_address(mut self, address: u8) -> Self {
        self.config.bus_address = address;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn frame_support(mut self, format: FrameFormat) -> Self {
        self.config.frame_support = format;
        self
    }

    pub fn config_block_index(mut self, index: u8) -> Self {
        self.config.config_block_index = index;
        self
    }

    pub fn build(self) -> ReaderConfig {
        self.config
    }
}

/// Cadence of the inventory polling driver
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Pause between two scans
    pub interval: Duration,

    /// Stop after this many scans (`None` runs until cancelled)
    pub max_iterations: Option<u64>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            max_iterations: None,
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_iterations(mut self, count: u64) -> Self {
        self.max_iterations = Some(count);
        self
    }
}
