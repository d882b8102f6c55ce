//! Job queue: deduplicating, rate-limited, retrying dispatch of URL jobs
//!
//! This module contains:
//! - The `FetchJobQueue` scheduler and its options
//! - Jobs and the retry policy applied to failed ones
//! - Sinks receiving results and error lines
//! - Queue statistics

mod job;
mod retry;
mod scheduler;
mod sink;
mod stats;

pub use job::Job;
pub use retry::{Backoff, RetryPolicy};
pub use scheduler::{FetchJobQueue, QueueOptions, DEFAULT_RATE_LIMIT};
pub use sink::{format_error_line, CollectingSink, JobSink, StdioSink};
pub use stats::QueueStats;
