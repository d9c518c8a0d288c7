//! Protocol constants and code tables

/// Default reader LAN port
pub const DEFAULT_PORT: u16 = 10001;

/// Bus address used over TCP (the reader ignores it on LAN)
pub const DEFAULT_BUS_ADDRESS: u8 = 255;

/// Default command timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 2;

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// EEPROM copy of LAN configuration block 40
///
/// Bit 7 selects the EEPROM rather than RAM.
pub const LAN_CONFIG_BLOCK: u8 = 0x80 | 40;

/// Size of the reader-info buffer
pub const READER_INFO_SIZE: usize = 300;

/// Offset of the descriptive byte inside the reader-info buffer
pub const READER_INFO_TYPE_OFFSET: usize = 4;

/// Header/echo bytes preceding the tag records of an inventory reply
pub const INVENTORY_HEADER_LEN: usize = 2;

/// Reader parameters understood by transports
pub mod params {
    /// Frame format selection
    pub const FRAME_SUPPORT: &str = "FrameSupport";

    pub const FRAME_STANDARD: &str = "Standard";

    pub const FRAME_ADVANCED: &str = "Advanced";
}

/// Status bytes reported by the reader (positive codes)
pub mod status {
    pub const OK: u8 = 0x00;
    pub const NO_TRANSPONDER: u8 = 0x01;
    pub const DATA_FALSE: u8 = 0x02;
    pub const WRITE_ERROR: u8 = 0x03;
    pub const ADDRESS_ERROR: u8 = 0x04;
    pub const WRONG_TRANSPONDER_TYPE: u8 = 0x05;
    pub const AUTHENT_ERROR: u8 = 0x08;
    pub const EEPROM_FAILURE: u8 = 0x10;
    pub const PARAMETER_RANGE_ERROR: u8 = 0x11;
    pub const LOGIN_REQUEST: u8 = 0x13;
    pub const LOGIN_ERROR: u8 = 0x14;
    pub const READ_PROTECT: u8 = 0x15;
    pub const WRITE_PROTECT: u8 = 0x16;
    pub const FIRMWARE_ACTIVATION_REQUIRED: u8 = 0x17;
    pub const UNKNOWN_COMMAND: u8 = 0x80;
    pub const LENGTH_ERROR: u8 = 0x81;
    pub const COMMAND_NOT_AVAILABLE: u8 = 0x82;
    pub const RF_COMMUNICATION_ERROR: u8 = 0x83;
    pub const RF_WARNING: u8 = 0x84;
    pub const DATA_BUFFER_OVERFLOW: u8 = 0x93;
    pub const MORE_DATA: u8 = 0x94;
    pub const ISO_ERROR: u8 = 0x95;

    /// Human text for a reader status byte
    pub fn text(code: u8) -> Option<&'static str> {
        let text = match code {
            OK => "OK",
            NO_TRANSPONDER => "No Transponder",
            DATA_FALSE => "Data False",
            WRITE_ERROR => "Write Error",
            ADDRESS_ERROR => "Address Error",
            WRONG_TRANSPONDER_TYPE => "Wrong Transponder Type",
            AUTHENT_ERROR => "Authentication Error",
            EEPROM_FAILURE => "EEPROM Failure",
            PARAMETER_RANGE_ERROR => "Parameter Range Error",
            LOGIN_REQUEST => "Login Request",
            LOGIN_ERROR => "Login Error",
            READ_PROTECT => "Read Protect",
            WRITE_PROTECT => "Write Protect",
            FIRMWARE_ACTIVATION_REQUIRED => "Firmware Activation Required",
            UNKNOWN_COMMAND => "Unknown Command",
            LENGTH_ERROR => "Length Error",
            COMMAND_NOT_AVAILABLE => "Command Not Available",
            RF_COMMUNICATION_ERROR => "RF Communication Error",
            RF_WARNING => "RF Warning",
            DATA_BUFFER_OVERFLOW => "Data Buffer Overflow",
            MORE_DATA => "More Data",
            ISO_ERROR => "ISO Error",
            _ => return None,
        };
        Some(text)
    }
}

/// Errors raised on the host side of the link (negative codes)
pub mod errors {
    /// TCP connection could not be opened
    pub const CONNECT_FAILED: i32 = -1;

    /// No reply within the command timeout
    pub const TIMEOUT: i32 = -2;

    /// Reply failed CRC verification
    pub const CRC_ERROR: i32 = -3;

    /// Reply frame was malformed
    pub const FRAME_ERROR: i32 = -4;

    /// Connection or reader handle is not known to the transport
    pub const UNKNOWN_HANDLE: i32 = -5;

    /// Reader parameter name or value not supported
    pub const INVALID_PARAMETER: i32 = -6;

    /// No text available for the requested code
    pub const UNKNOWN_CODE: i32 = -7;

    /// Request did not fit in a frame
    pub const REQUEST_TOO_LARGE: i32 = -8;

    /// Human text for a host-side error code
    pub fn text(code: i32) -> Option<&'static str> {
        let text = match code {
            CONNECT_FAILED => "Connection to reader failed",
            TIMEOUT => "Timeout waiting for reader response",
            CRC_ERROR => "Response CRC error",
            FRAME_ERROR => "Malformed response frame",
            UNKNOWN_HANDLE => "Unknown connection or reader handle",
            INVALID_PARAMETER => "Unsupported reader parameter",
            UNKNOWN_CODE => "Unknown status or error code",
            REQUEST_TOO_LARGE => "Request too large for frame",
            _ => return None,
        };
        Some(text)
    }
}
