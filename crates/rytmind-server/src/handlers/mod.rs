//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod budget;
pub mod chat;
pub mod journal;
pub mod insights;
pub mod transactions;

// Re-export all handlers for use in router
pub use analysis::*;
pub use budget::*;
pub use chat::*;
pub use journal::*;
pub use insights::*;
pub use transactions::*;
