//! # obidrfid-core
//!
//! Core protocol implementation for OBID RFID readers.
//!
//! This crate provides the low-level protocol primitives:
//! - Command definitions and code tables
//! - ISO-host frame encoding/decoding and CRC
//! - Request builders and reply decoders
//! - Reply classification
//! - Session state

pub mod codec;
pub mod codes;
pub mod command;
pub mod crc;
pub mod error;
pub mod frame;
pub mod outcome;
pub mod session;

pub use command::Command;
pub use error::{Error, Result};
pub use frame::{FrameFormat, Request, Response};
pub use outcome::{classify, Classification, Outcome};
pub use session::{ConnectionHandle, ReaderHandle, Session, SessionState};
