//! ISO-host protocol frames and encoding/decoding

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    codes::params,
    command::Command,
    crc,
    error::{Error, Result},
};

/// Start byte of an advanced frame
pub const STX: u8 = 0x02;

/// Frame layout negotiated with the reader
///
/// # Frame Structure
///
/// ```text
/// Standard request:  [LEN][COM-ADR][CMD][DATA...][CRC lo][CRC hi]
/// Standard response: [LEN][COM-ADR][CMD][STATUS][DATA...][CRC lo][CRC hi]
///
/// Advanced request:  [STX][ALEN hi][ALEN lo][COM-ADR][CMD][DATA...][CRC lo][CRC hi]
/// Advanced response: [STX][ALEN hi][ALEN lo][COM-ADR][CMD][STATUS][DATA...][CRC lo][CRC hi]
/// ```
///
/// The length field counts the whole frame, including itself and the CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    /// One-byte length, frames up to 255 bytes
    Standard,

    /// STX plus two-byte big-endian length, frames up to 65535 bytes
    #[default]
    Advanced,
}

impl FrameFormat {
    /// Bytes before COM-ADR (the length prefix)
    pub fn prefix_len(self) -> usize {
        match self {
            Self::Standard => 1,
            Self::Advanced => 3,
        }
    }

    /// Largest frame the length field can describe
    pub fn max_frame_len(self) -> usize {
        match self {
            Self::Standard => u8::MAX as usize,
            Self::Advanced => u16::MAX as usize,
        }
    }

    /// Smallest valid response frame (no data)
    pub fn min_response_len(self) -> usize {
        // prefix + COM-ADR + CMD + STATUS + CRC
        self.prefix_len() + 3 + 2
    }

    /// Total frame length announced by a length prefix
    ///
    /// `prefix` must hold at least [`prefix_len`](Self::prefix_len) bytes.
    pub fn declared_len(self, prefix: &[u8]) -> Result<usize> {
        if prefix.len() < self.prefix_len() {
            return Err(Error::FrameTooShort {
                expected: self.prefix_len(),
                actual: prefix.len(),
            });
        }

        match self {
            Self::Standard => Ok(prefix[0] as usize),
            Self::Advanced => {
                if prefix[0] != STX {
                    return Err(Error::UnexpectedStartByte(prefix[0]));
                }
                Ok(BigEndian::read_u16(&prefix[1..3]) as usize)
            }
        }
    }

    /// Value of the `FrameSupport` reader parameter
    pub fn param_value(self) -> &'static str {
        match self {
            Self::Standard => params::FRAME_STANDARD,
            Self::Advanced => params::FRAME_ADVANCED,
        }
    }

    /// Parse a `FrameSupport` parameter value
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            params::FRAME_STANDARD => Some(Self::Standard),
            params::FRAME_ADVANCED => Some(Self::Advanced),
            _ => None,
        }
    }

    fn put_header(self, buf: &mut BytesMut, total_len: usize) {
        match self {
            Self::Standard => buf.put_u8(total_len as u8),
            Self::Advanced => {
                let mut len = [0u8; 2];
                BigEndian::write_u16(&mut len, total_len as u16);
                buf.put_u8(STX);
                buf.put_slice(&len);
            }
        }
    }
}

/// Append the CRC of everything already in `buf`
fn seal(mut buf: BytesMut) -> BytesMut {
    let crc = crc::calculate(&buf);
    buf.put_u16_le(crc);
    buf
}

/// Host → reader frame
///
/// # Examples
///
/// ```
/// use obidrfid_core::{Command, FrameFormat, Request};
///
/// let request = Request::new(Command::SystemReset, 255);
/// let encoded = request.encode(FrameFormat::Advanced).unwrap();
/// assert_eq!(encoded.len(), 7);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Request {
    /// Command code
    pub command: Command,

    /// Reader bus address (COM-ADR)
    pub bus_address: u8,

    /// Command-specific data
    pub data: Bytes,
}

impl Request {
    /// Create a request with no data
    pub fn new(command: Command, bus_address: u8) -> Self {
        Self {
            command,
            bus_address,
            data: Bytes::new(),
        }
    }

    /// Create a request with data
    pub fn with_data(command: Command, bus_address: u8, data: impl Into<Bytes>) -> Self {
        Self {
            command,
            bus_address,
            data: data.into(),
        }
    }

    /// Total encoded size in `format`
    pub fn size(&self, format: FrameFormat) -> usize {
        format.prefix_len() + 2 + self.data.len() + 2
    }

    /// Encode request to bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the frame does not fit the length field.
    pub fn encode(&self, format: FrameFormat) -> Result<BytesMut> {
        let total_len = self.size(format);
        if total_len > format.max_frame_len() {
            return Err(Error::PayloadTooLarge {
                size: self.data.len(),
                max: format.max_frame_len() - (total_len - self.data.len()),
            });
        }

        let mut buf = BytesMut::with_capacity(total_len);
        format.put_header(&mut buf, total_len);
        buf.put_u8(self.bus_address);
        buf.put_u8(self.command.into());
        buf.put_slice(&self.data);

        Ok(seal(buf))
    }

    /// Decode a request frame (used by reader-side tooling and tests)
    pub fn decode(buf: &[u8], format: FrameFormat) -> Result<Self> {
        let body = check_frame(buf, format, format.prefix_len() + 2 + 2)?;
        Ok(Self {
            bus_address: body[0],
            command: Command::try_from(body[1])?,
            data: Bytes::copy_from_slice(&body[2..]),
        })
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("command", &self.command)
            .field("bus_address", &format!("0x{:02X}", self.bus_address))
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

/// Reader → host frame
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    /// Command code echoed by the reader
    pub command: Command,

    /// Reader bus address (COM-ADR)
    pub bus_address: u8,

    /// Reader status byte
    pub status: u8,

    /// Response data
    pub data: Bytes,
}

impl Response {
    pub fn new(command: Command, bus_address: u8, status: u8, data: impl Into<Bytes>) -> Self {
        Self {
            command,
            bus_address,
            status,
            data: data.into(),
        }
    }

    /// Decode response from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than the minimum response
    /// - Advanced frame does not start with STX
    /// - Length field disagrees with the buffer
    /// - CRC verification fails
    /// - Command code is unknown
    pub fn decode(buf: &[u8], format: FrameFormat) -> Result<Self> {
        let body = check_frame(buf, format, format.min_response_len())?;
        Ok(Self {
            bus_address: body[0],
            command: Command::try_from(body[1])?,
            status: body[2],
            data: Bytes::copy_from_slice(&body[3..]),
        })
    }

    /// Encode response to bytes (used by reader simulators and tests)
    pub fn encode(&self, format: FrameFormat) -> Result<BytesMut> {
        let total_len = format.prefix_len() + 3 + self.data.len() + 2;
        if total_len > format.max_frame_len() {
            return Err(Error::PayloadTooLarge {
                size: self.data.len(),
                max: format.max_frame_len() - (total_len - self.data.len()),
            });
        }

        let mut buf = BytesMut::with_capacity(total_len);
        format.put_header(&mut buf, total_len);
        buf.put_u8(self.bus_address);
        buf.put_u8(self.command.into());
        buf.put_u8(self.status);
        buf.put_slice(&self.data);

        Ok(seal(buf))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("command", &self.command)
            .field("bus_address", &format!("0x{:02X}", self.bus_address))
            .field("status", &format!("0x{:02X}", self.status))
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response[{}](status=0x{:02X}, len={})",
            self.command,
            self.status,
            self.data.len()
        )
    }
}

/// Validate length prefix and CRC, returning the bytes between prefix and CRC
fn check_frame(buf: &[u8], format: FrameFormat, min_len: usize) -> Result<&[u8]> {
    if buf.len() < min_len {
        return Err(Error::FrameTooShort {
            expected: min_len,
            actual: buf.len(),
        });
    }

    let declared = format.declared_len(buf)?;
    if declared != buf.len() {
        return Err(Error::FrameLengthMismatch {
            declared,
            actual: buf.len(),
        });
    }

    let crc_at = buf.len() - 2;
    let received = u16::from_le_bytes([buf[crc_at], buf[crc_at + 1]]);
    let expected = crc::calculate(&buf[..crc_at]);
    if expected != received {
        return Err(Error::CrcMismatch { expected, received });
    }

    Ok(&buf[format.prefix_len()..crc_at])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_encode_advanced() {
        let request = Request::with_data(Command::IsoCommand, 0xFF, vec![0x01, 0x00]);
        let encoded = request.encode(FrameFormat::Advanced).unwrap();

        assert_eq!(encoded.len(), 9);
        assert_eq!(&encoded[..7], &[STX, 0x00, 0x09, 0xFF, 0xB0, 0x01, 0x00]);

        let crc = crc::calculate(&encoded[..7]);
        assert_eq!(&encoded[7..], &crc.to_le_bytes());
    }

    #[test]
    fn test_request_encode_standard() {
        let request = Request::with_data(Command::ReaderInfo, 0xFF, vec![0x00]);
        let encoded = request.encode(FrameFormat::Standard).unwrap();

        assert_eq!(encoded.len(), 6);
        assert_eq!(&encoded[..4], &[0x06, 0xFF, 0x66, 0x00]);
    }

    #[test]
    fn test_request_decode() {
        let original = Request::with_data(Command::ReadConfig, 0xFF, vec![168]);
        let encoded = original.encode(FrameFormat::Advanced).unwrap();

        let decoded = Request::decode(&encoded, FrameFormat::Advanced).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_response_decode() {
        let response = Response::new(Command::ReadConfig, 0xFF, 0x00, vec![1, 2, 3]);
        let encoded = response.encode(FrameFormat::Advanced).unwrap();

        let decoded = Response::decode(&encoded, FrameFormat::Advanced).unwrap();
        assert_eq!(decoded.command, Command::ReadConfig);
        assert_eq!(decoded.status, 0x00);
        assert_eq!(decoded.data.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn test_response_decode_standard_status() {
        let response = Response::new(Command::IsoCommand, 0xFF, 0x01, Bytes::new());
        let encoded = response.encode(FrameFormat::Standard).unwrap();
        assert_eq!(encoded.len(), FrameFormat::Standard.min_response_len());

        let decoded = Response::decode(&encoded, FrameFormat::Standard).unwrap();
        assert_eq!(decoded.status, 0x01);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_response_crc_verification() {
        let response = Response::new(Command::SystemReset, 0xFF, 0x00, Bytes::new());
        let mut encoded = response.encode(FrameFormat::Advanced).unwrap();

        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;

        let result = Response::decode(&encoded, FrameFormat::Advanced);
        if let Err(Error::CrcMismatch { expected, received }) = result {
            assert_ne!(expected, received);
        } else {
            panic!("Expected CrcMismatch error");
        }
    }

    #[test]
    fn test_response_too_short() {
        let result = Response::decode(&[STX, 0x00, 0x03], FrameFormat::Advanced);
        assert!(matches!(result, Err(Error::FrameTooShort { .. })));
    }

    #[test]
    fn test_response_bad_start_byte() {
        let response = Response::new(Command::SystemReset, 0xFF, 0x00, Bytes::new());
        let mut encoded = response.encode(FrameFormat::Advanced).unwrap();
        encoded[0] = 0x7E;

        let result = Response::decode(&encoded, FrameFormat::Advanced);
        assert!(matches!(result, Err(Error::UnexpectedStartByte(0x7E))));
    }

    #[test]
    fn test_response_length_mismatch() {
        let response = Response::new(Command::ReaderInfo, 0xFF, 0x00, vec![0; 4]);
        let encoded = response.encode(FrameFormat::Advanced).unwrap();

        let result = Response::decode(&encoded[..encoded.len() - 1], FrameFormat::Advanced);
        assert!(matches!(result, Err(Error::FrameLengthMismatch { .. })));
    }

    #[test]
    fn test_standard_frame_too_large() {
        let request = Request::with_data(Command::WriteConfig, 0xFF, vec![0; 300]);

        assert!(matches!(
            request.encode(FrameFormat::Standard),
            Err(Error::PayloadTooLarge { .. })
        ));
        assert!(request.encode(FrameFormat::Advanced).is_ok());
    }

    #[test]
    fn test_declared_len() {
        assert_eq!(FrameFormat::Advanced.declared_len(&[STX, 0x01, 0x2C]).unwrap(), 300);
        assert_eq!(FrameFormat::Standard.declared_len(&[0x09]).unwrap(), 9);
        assert!(FrameFormat::Advanced.declared_len(&[STX]).is_err());
    }

    #[test]
    fn test_frame_format_param() {
        assert_eq!(FrameFormat::from_param("Advanced"), Some(FrameFormat::Advanced));
        assert_eq!(FrameFormat::from_param("Standard"), Some(FrameFormat::Standard));
        assert_eq!(FrameFormat::from_param("Fancy"), None);
        assert_eq!(FrameFormat::default().param_value(), "Advanced");
    }
}
