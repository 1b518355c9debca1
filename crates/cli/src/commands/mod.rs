//! Command handlers for the ragdex CLI.

pub mod index;
pub mod search;
pub mod seed;

// Re-export command types for convenience
pub use index::IndexCommand;
pub use search::SearchCommand;
pub use seed::SeedCommand;
