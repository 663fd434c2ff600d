//! ReplyHUD Utilities
//!
//! Configuration loading and logging setup shared by the core, LLM and CLI
//! crates.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod logging;

pub use config::{load_config, ConfigBuilder};
pub use logging::{init_logging, LogLevel, LoggerConfig};

/// Result type used throughout ReplyHUD utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
