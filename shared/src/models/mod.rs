//! Data models
//!
//! Floor-plan entities shared by the client, the editor and the CLI.
//! Serialized camelCase to match the exported canvas file.

pub mod chair;
pub mod line;
pub mod table;

// Re-exports
pub use chair::*;
pub use line::*;
pub use table::*;
