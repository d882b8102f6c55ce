//! bracket-fetch: a throttled fetcher for bracketed links
//!
//! This crate scans free-form text for URLs wrapped in `[ ... ]` spans, fetches
//! each distinct URL at a bounded admission rate, and reports the page title and
//! an HMAC-obfuscated contact email for every page it reaches.

pub mod config;
pub mod parser;
pub mod processor;
pub mod queue;
pub mod runner;
pub mod state;

use thiserror::Error;

/// Main error type for bracket-fetch operations
#[derive(Debug, Error)]
pub enum BracketFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("SECRET is not set")]
    MissingSecret,
}

/// Per-job fetch errors
///
/// These never escape the scheduler: they are reported to the error sink and
/// feed the retry decision.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Returns the URL the error belongs to, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. } | Self::Http { url, .. } => Some(url),
            Self::Client(e) => e.url().map(|u| u.as_str()),
        }
    }
}

/// Result type alias for bracket-fetch operations
pub type Result<T> = std::result::Result<T, BracketFetchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{load_config, load_secret, Config, Secret};
pub use parser::BracketParser;
pub use processor::{HttpUrlProcessor, UrlInfo, UrlProcessor};
pub use queue::{FetchJobQueue, Job, QueueStats, RetryPolicy};
pub use state::Lifecycle;
