//! Reader command definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// The subset of the ISO-host command set this library speaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Reader system reset (commits EEPROM configuration)
    SystemReset = 0x64,

    /// Read reader information
    ReaderInfo = 0x66,

    /// Read a configuration block
    ReadConfig = 0x80,

    /// Write a configuration block
    WriteConfig = 0x81,

    /// ISO host command (inventory and friends)
    IsoCommand = 0xB0,
}

impl Command {
    /// Check if the command changes reader state
    pub fn is_write(self) -> bool {
        matches!(self, Self::WriteConfig | Self::SystemReset)
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::SystemReset => "CMD_SYSTEM_RESET",
            Self::ReaderInfo => "CMD_READER_INFO",
            Self::ReadConfig => "CMD_READ_CONF_BLOCK",
            Self::WriteConfig => "CMD_WRITE_CONF_BLOCK",
            Self::IsoCommand => "CMD_ISO_HOST",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x64 => Ok(Self::SystemReset),
            0x66 => Ok(Self::ReaderInfo),
            0x80 => Ok(Self::ReadConfig),
            0x81 => Ok(Self::WriteConfig),
            0xB0 => Ok(Self::IsoCommand),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!(u8::from(Command::IsoCommand), 0xB0);
        assert_eq!(Command::try_from(0xB0).unwrap(), Command::IsoCommand);
        assert_eq!(Command::try_from(0x81).unwrap(), Command::WriteConfig);
    }

    #[test]
    fn test_command_is_write() {
        assert!(Command::WriteConfig.is_write());
        assert!(Command::SystemReset.is_write());
        assert!(!Command::ReadConfig.is_write());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::ReaderInfo.to_string(), "CMD_READER_INFO(0x66)");
    }

    #[test]
    fn test_unknown_command() {
        let result = Command::try_from(0x99);
        assert!(matches!(result, Err(Error::UnknownCommand(0x99))));
    }
}
