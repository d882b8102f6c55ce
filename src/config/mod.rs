//! Configuration module for bracket-fetch
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus reading the HMAC secret from the environment.
//!
//! # Example
//!
//! ```no_run
//! use bracket_fetch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bracket-fetch.toml")).unwrap();
//! println!("Admitting one job every {}ms", config.queue.rate_limit_ms);
//! ```

mod parser;
mod secret;
mod types;
mod validation;

// Re-export types
pub use types::{BackoffKind, Config, HttpConfig, QueueConfig};

// Re-export loader functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use secret::{load_secret, secret_from_env, Secret, SECRET_VAR};
pub use validation::{validate, MAX_RETRIES_LIMIT};
