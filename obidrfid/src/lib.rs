//! # obidrfid
//!
//! Unofficial Rust library for OBID (FEIG) RFID LAN readers.
//!
//! ## Features
//!
//! - Async/await API using Tokio
//! - Native ISO-host protocol over TCP (no vendor library)
//! - Typed reply outcomes: success, reader status, error
//! - Inventory, reader info, LAN configuration and reset
//!
//! ## Quick Start
//!
//! ```no_run
//! use obidrfid::{Outcome, Reader, ReaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> obidrfid::Result<()> {
//!     let mut reader = Reader::new(ReaderConfig::default());
//!     reader.connect("192.168.10.10", 10001).await?;
//!
//!     match reader.scan().await? {
//!         Outcome::Success(inventory) => {
//!             for record in &inventory {
//!                 println!("{}", record);
//!             }
//!         }
//!         other => println!("Scan returned {}", other),
//!     }
//!
//!     reader.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod poll;
pub mod reader;
pub mod resolver;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::{PollOptions, ReaderConfig};
pub use error::{Error, OutcomeExt, Result};
pub use poll::{poll_inventory, CancelToken, PollSummary};
pub use reader::Reader;
pub use resolver::Resolver;

// Re-export types
pub use obidrfid_core::{Classification, FrameFormat, Outcome, SessionState};
pub use obidrfid_transport::{TcpTransport, Transport};
pub use obidrfid_types::{ConfigBlock, InventoryResult, ReaderInfo, TransponderRecord};
