//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, seed) and shared utilities (open_db)
//! - `serve` - Web server command
//! - `status` - Status command

pub mod core;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use serve::*;
pub use status::*;
