//! Command handlers for the Clause CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod health;
pub mod index;
mod setup;
pub mod sources;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use health::HealthCommand;
pub use index::IndexCommand;
pub use sources::SourcesCommand;
