use crate::ConfigError;
use std::fmt;

/// Environment variable holding the HMAC key
pub const SECRET_VAR: &str = "SECRET";

/// HMAC key used to obfuscate discovered emails
///
/// The value never appears in `Debug` output.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value, rejecting empty or whitespace-only input
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Reads the secret from the environment
///
/// A `.env` file in the working directory is loaded first, if present, without
/// overriding variables that are already set.
///
/// # Returns
///
/// * `Ok(Secret)` - `SECRET` is set and non-empty
/// * `Err(ConfigError::MissingSecret)` - It is unset or blank
pub fn load_secret() -> Result<Secret, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    secret_from_env(SECRET_VAR)
}

/// Reads the secret from a specific environment variable
pub fn secret_from_env(var: &str) -> Result<Secret, ConfigError> {
    match std::env::var(var) {
        Ok(value) => Secret::new(value),
        Err(_) => Err(ConfigError::MissingSecret),
    }
}
