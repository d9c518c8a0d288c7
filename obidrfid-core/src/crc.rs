//! ISO-host frame CRC16
//!
//! From the reader's protocol description:
//! 1. Preset the register with 0xFFFF
//! 2. For every byte before the CRC field, XOR it into the low byte
//! 3. Shift right 8 times, XOR with 0x8408 whenever a 1 falls out
//! 4. No final XOR; the CRC is sent LSB first

use tracing::trace;

/// CRC register preset
pub const PRESET: u16 = 0xFFFF;

/// Reflected polynomial (x^16 + x^12 + x^5 + 1)
pub const POLYNOMIAL: u16 = 0x8408;

/// Calculate the CRC over `data`
///
/// # Algorithm
///
/// ```text
/// crc = 0xFFFF
/// for b in data:
///     crc ^= b
///     repeat 8: crc = (crc & 1) ? (crc >> 1) ^ 0x8408 : crc >> 1
/// ```
///
/// # Examples
///
/// ```
/// use obidrfid_core::crc;
///
/// let crc = crc::calculate(&[0x07, 0xFF, 0x66, 0x00]);
/// println!("CRC: 0x{:04X}", crc);
/// ```
pub fn calculate(data: &[u8]) -> u16 {
    let mut crc = PRESET;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }

    trace!(
        len = data.len(),
        crc = format!("0x{:04X}", crc),
        "Calculated CRC"
    );

    crc
}

/// Verify CRC
pub fn verify(data: &[u8], expected: u16) -> bool {
    calculate(data) == expected
}
