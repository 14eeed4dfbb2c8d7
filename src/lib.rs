pub mod config;
pub mod error;

// Matching engine
pub mod corpus;
pub mod matcher;

// Embedding boundary
pub mod embed;
pub mod proxy;

// CLI
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
