//! Type definitions for obidrfid
//!
//! Plain data decoded from (or written to) an OBID reader:
//! - Transponder records and inventory results
//! - Reader information
//! - The LAN configuration block

pub mod config_block;
pub mod error;
pub mod reader_info;
pub mod transponder;

pub use config_block::ConfigBlock;
pub use error::{Error, Result};
pub use reader_info::ReaderInfo;
pub use transponder::{InventoryResult, TransponderRecord};
