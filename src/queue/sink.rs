//! Consumers of job outcomes

use crate::processor::UrlInfo;
use crate::queue::Job;
use crate::FetchError;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Receives the outcome of every processed job
///
/// Called from the task that processed the job, so results arrive in
/// completion order.
pub trait JobSink: Send + Sync {
    /// A job produced a result
    fn on_success(&self, info: &UrlInfo);

    /// A job attempt failed; called once per failed attempt
    fn on_failure(&self, job: &Job, error: &FetchError);
}

/// Formats the error-sink line for a failed attempt
///
/// ```
/// use bracket_fetch::queue::format_error_line;
///
/// assert_eq!(format_error_line("https://a.com", "HTTP 500"), "[ERROR] https://a.com -> HTTP 500");
/// ```
pub fn format_error_line(url: &str, message: impl std::fmt::Display) -> String {
    format!("[ERROR] {} -> {}", url, message)
}

/// Writes results as JSON lines to stdout and failures to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl JobSink for StdioSink {
    fn on_success(&self, info: &UrlInfo) {
        let line = match serde_json::to_string(info) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize result for {}: {}", info.url, e);
                return;
            }
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            tracing::warn!("Failed to write result for {}: {}", info.url, e);
        }
    }

    fn on_failure(&self, job: &Job, error: &FetchError) {
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = writeln!(stderr, "{}", format_error_line(&job.url, error)) {
            tracing::warn!("Failed to write error for {}: {}", job.url, e);
        }
    }
}

/// Keeps every outcome in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    successes: Mutex<Vec<UrlInfo>>,
    failures: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results received so far, in completion order
    pub fn successes(&self) -> Vec<UrlInfo> {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error lines received so far, formatted as the error sink prints them
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl JobSink for CollectingSink {
    fn on_success(&self, info: &UrlInfo) {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(info.clone());
    }

    fn on_failure(&self, job: &Job, error: &FetchError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format_error_line(&job.url, error));
    }
}
