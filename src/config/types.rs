use serde::Deserialize;

pub const DEFAULT_RATE_LIMIT_MS: u64 = 1_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for bracket-fetch
///
/// Every section and key is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Job queue behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Minimum time between two job admissions (milliseconds)
    #[serde(rename = "rate-limit-ms", default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Delay before a failed job is re-queued (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Number of retries after the first failed attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// How the retry delay grows between attempts
    #[serde(default)]
    pub backoff: BackoffKind,
}

/// Retry delay growth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles with each retry
    Exponential,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffKind::Fixed,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

fn default_rate_limit_ms() -> u64 {
    DEFAULT_RATE_LIMIT_MS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl QueueConfig {
    /// Minimum spacing between admissions
    pub fn rate_limit(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.rate_limit_ms)
    }

    /// Builds the retry policy this section describes
    pub fn retry_policy(&self) -> crate::queue::RetryPolicy {
        use crate::queue::RetryPolicy;

        let delay = std::time::Duration::from_millis(self.retry_delay_ms);
        match self.backoff {
            BackoffKind::Fixed => RetryPolicy::fixed(self.max_retries, delay),
            BackoffKind::Exponential => RetryPolicy::exponential(self.max_retries, delay),
        }
    }
}
