//! Rate-limited, deduplicating job scheduler
//!
//! This module handles:
//! - Turning text chunks into jobs through the bracket parser
//! - Admitting each distinct URL once
//! - Dispatching at most one job per rate-limit interval, without capping
//!   how many run at the same time
//! - Re-queuing failed jobs according to the retry policy
//! - Signalling when all work has drained

use crate::config::QueueConfig;
use crate::parser::BracketParser;
use crate::processor::UrlProcessor;
use crate::queue::{Job, JobSink, QueueStats, RetryPolicy};
use crate::state::Lifecycle;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

/// Default spacing between two admissions
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1_000);

/// Fixed settings of a queue
#[derive(Debug, Clone, Copy)]
pub struct QueueOptions {
    /// Minimum time between two dispatches
    pub rate_limit: Duration,

    pub retry_policy: RetryPolicy,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl From<&QueueConfig> for QueueOptions {
    fn from(config: &QueueConfig) -> Self {
        Self {
            rate_limit: config.rate_limit(),
            retry_policy: config.retry_policy(),
        }
    }
}

/// Mutable queue state, only touched under the state lock
#[derive(Debug, Default)]
struct QueueState {
    /// Jobs waiting for dispatch, front first
    pending: VecDeque<Job>,

    /// Every URL ever admitted
    seen: HashSet<String>,

    /// Jobs dispatched but not yet settled
    in_flight: usize,

    /// Retries whose delay has not elapsed yet
    waiting_retries: usize,

    lifecycle: Lifecycle,

    /// Earliest moment the next dispatch may happen
    next_admission: Option<Instant>,

    stats: QueueStats,
}

impl QueueState {
    fn is_quiescent(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }

    fn is_drained(&self) -> bool {
        self.is_quiescent() && self.waiting_retries == 0
    }
}

struct Inner {
    parser: Mutex<BracketParser>,
    state: Mutex<QueueState>,

    /// Wakes the dispatch task when work arrives or a job settles
    wakeup: Notify,

    /// `true` whenever nothing is pending, in flight, or waiting to retry
    drained: watch::Sender<bool>,

    /// Flips to `true` once on shutdown; cancels waiting retries
    stop: watch::Sender<bool>,

    processor: Arc<dyn UrlProcessor>,
    sink: Arc<dyn JobSink>,
    options: QueueOptions,
}

/// Rate-limited fetch queue fed by bracketed text
///
/// Cloning is cheap and every clone drives the same queue.
///
/// All methods that may start work (`handle_chunk`, `add_url`) must be called
/// from within a Tokio runtime, since dispatch and retries run as spawned tasks.
///
/// # Example
///
/// ```no_run
/// use bracket_fetch::config::{HttpConfig, Secret};
/// use bracket_fetch::processor::HttpUrlProcessor;
/// use bracket_fetch::queue::{FetchJobQueue, StdioSink};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let processor = HttpUrlProcessor::new(&HttpConfig::default(), Secret::new("key")?)?;
/// let queue = FetchJobQueue::new(Arc::new(processor), Arc::new(StdioSink));
///
/// queue.handle_chunk("hello [ https://example.com ]");
/// queue.wait_until_drained().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FetchJobQueue {
    inner: Arc<Inner>,
}

impl FetchJobQueue {
    /// Creates a queue with the default rate limit and retry policy
    pub fn new(processor: Arc<dyn UrlProcessor>, sink: Arc<dyn JobSink>) -> Self {
        Self::with_options(processor, sink, QueueOptions::default())
    }

    /// Creates a queue with explicit options
    pub fn with_options(
        processor: Arc<dyn UrlProcessor>,
        sink: Arc<dyn JobSink>,
        options: QueueOptions,
    ) -> Self {
        let (drained, _) = watch::channel(true);
        let (stop, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                parser: Mutex::new(BracketParser::new()),
                state: Mutex::new(QueueState::default()),
                wakeup: Notify::new(),
                drained,
                stop,
                processor,
                sink,
                options,
            }),
        }
    }

    /// Scans a chunk of text and queues every new URL it yields
    ///
    /// Spans may straddle chunks; the parser state is kept between calls.
    pub fn handle_chunk(&self, chunk: &str) {
        let urls = self
            .inner
            .parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .feed(chunk);

        for url in urls {
            self.add_url(&url);
        }
    }

    /// Queues a URL unless it was seen before or the queue is stopped
    ///
    /// # Returns
    ///
    /// `true` if a new job was created
    pub fn add_url(&self, url: &str) -> bool {
        let mut state = self.inner.lock_state();

        if !state.lifecycle.accepts_work() {
            state.stats.rejected += 1;
            tracing::warn!("Queue is stopped, ignoring {}", url);
            return false;
        }

        if !state.seen.insert(url.to_string()) {
            state.stats.duplicates += 1;
            tracing::trace!("Already seen {}", url);
            return false;
        }

        state.stats.discovered += 1;
        state.pending.push_back(Job::new(url));
        tracing::debug!("Queued {} ({} pending)", url, state.pending.len());

        self.inner.ensure_running(&mut state);
        self.inner.refresh_drained(&state);
        true
    }

    /// Resolves once nothing is pending, in flight, or waiting to be retried
    ///
    /// Resolves immediately when the queue is already drained, including when
    /// no URL was ever added. The queue stays usable afterwards: URLs added
    /// later start a new round of work that can be awaited again.
    pub async fn wait_until_drained(&self) {
        let mut drained = self.inner.drained.subscribe();
        // The sender lives as long as `self`, so this can't observe a closed channel
        let _ = drained.wait_for(|done| *done).await;

        tracing::info!("Queue drained: {}", self.stats());
    }

    /// Stops the queue for good
    ///
    /// Pending jobs are discarded, waiting retries are cancelled, and URLs
    /// added afterwards are rejected. Jobs already in flight still complete
    /// and report to the sink.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock_state();

        if state.lifecycle.is_terminal() {
            return;
        }
        if let Err(e) = state.lifecycle.transition_to(Lifecycle::Stopped) {
            tracing::warn!("{}", e);
            return;
        }

        let discarded = state.pending.len();
        state.pending.clear();
        state.stats.dropped += discarded as u64;
        tracing::info!(
            "Queue stopped: {} pending discarded, {} in flight, {} retries cancelled",
            discarded,
            state.in_flight,
            state.waiting_retries
        );

        self.inner.stop.send_replace(true);
        self.inner.wakeup.notify_one();
        self.inner.refresh_drained(&state);
    }

    /// Snapshot of the queue counters
    pub fn stats(&self) -> QueueStats {
        self.inner.lock_state().stats.clone()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lock_state().lifecycle
    }

    /// Number of jobs waiting for dispatch
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// Number of jobs dispatched but not yet settled
    pub fn in_flight(&self) -> usize {
        self.inner.lock_state().in_flight
    }

    pub fn is_drained(&self) -> bool {
        self.inner.lock_state().is_drained()
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_drained(&self, state: &QueueState) {
        let drained = state.is_drained();
        self.drained.send_if_modified(|current| {
            if *current == drained {
                return false;
            }
            *current = drained;
            true
        });
    }

    /// Starts the dispatch task if idle, or wakes it if it is already running
    fn ensure_running(self: &Arc<Self>, state: &mut QueueState) {
        match state.lifecycle {
            Lifecycle::Idle => {
                if let Err(e) = state.lifecycle.transition_to(Lifecycle::Running) {
                    tracing::warn!("{}", e);
                    return;
                }
                tracing::info!("Dispatcher started");
                tokio::spawn(Arc::clone(self).dispatch_loop());
            }
            Lifecycle::Running => self.wakeup.notify_one(),
            Lifecycle::Stopped => {}
        }
    }

    /// Single coordinating task: waits for work and for the next admission
    /// slot, then dispatches one job at a time
    async fn dispatch_loop(self: Arc<Self>) {
        loop {
            let ready_at = {
                let mut state = self.lock_state();

                if state.lifecycle != Lifecycle::Running {
                    return;
                }

                if state.pending.is_empty() {
                    if state.is_quiescent() {
                        if let Err(e) = state.lifecycle.transition_to(Lifecycle::Idle) {
                            tracing::warn!("{}", e);
                        }
                        tracing::info!("Dispatcher idle");
                        return;
                    }
                    None
                } else {
                    Some(state.next_admission)
                }
            };

            match ready_at {
                // Jobs are in flight but nothing is queued
                None => {
                    self.wakeup.notified().await;
                    continue;
                }
                Some(Some(at)) => tokio::time::sleep_until(at).await,
                Some(None) => {}
            }

            self.admit_next();
        }
    }

    fn admit_next(self: &Arc<Self>) {
        let job = {
            let mut state = self.lock_state();

            if state.lifecycle != Lifecycle::Running {
                return;
            }
            let Some(job) = state.pending.pop_front() else {
                return;
            };

            state.in_flight += 1;
            state.stats.dispatched += 1;
            state.next_admission = Some(Instant::now() + self.options.rate_limit);
            job
        };

        if job.is_retry() {
            tracing::info!("Dispatching retry {} of {}", job.attempt, job.url);
        } else {
            tracing::debug!("Dispatching {}", job.url);
        }
        tokio::spawn(Arc::clone(self).run_job(job));
    }

    async fn run_job(self: Arc<Self>, job: Job) {
        let _settle = InFlight {
            inner: Arc::clone(&self),
            url: job.url.clone(),
        };
        let result = self.processor.process(&job.url).await;

        match &result {
            Ok(info) => self.sink.on_success(info),
            Err(e) => self.sink.on_failure(&job, e),
        }

        let mut state = self.lock_state();
        match result {
            Ok(_) => state.stats.succeeded += 1,
            Err(_) => {
                state.stats.failed_attempts += 1;
                self.schedule_retry(&mut state, &job);
            }
        }
    }

    fn schedule_retry(self: &Arc<Self>, state: &mut QueueState, job: &Job) {
        if !state.lifecycle.accepts_work() {
            state.stats.dropped += 1;
            return;
        }

        let Some(delay) = self.options.retry_policy.delay_for(job.attempt) else {
            state.stats.dropped += 1;
            tracing::warn!(
                "Giving up on {} after {} attempt(s)",
                job.url,
                job.attempt + 1
            );
            return;
        };

        state.waiting_retries += 1;
        state.stats.retries_scheduled += 1;
        tracing::info!("Retrying {} in {:?}", job.url, delay);

        // Subscribed under the lock so a concurrent shutdown can't be missed
        let stop = self.stop.subscribe();
        tokio::spawn(Arc::clone(self).requeue_after(job.next_attempt(), delay, stop));
    }

    async fn requeue_after(
        self: Arc<Self>,
        job: Job,
        delay: Duration,
        mut stop: watch::Receiver<bool>,
    ) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop.wait_for(|stopped| *stopped) => {}
        }

        let mut state = self.lock_state();
        state.waiting_retries -= 1;

        if state.lifecycle.accepts_work() {
            state.pending.push_back(job);
            self.ensure_running(&mut state);
        } else {
            state.stats.dropped += 1;
            tracing::debug!("Dropped retry of {} after shutdown", job.url);
        }

        self.refresh_drained(&state);
    }
}

/// Settles one dispatched job when dropped
///
/// Runs on unwind too, so a panicking processor still releases its slot and
/// the queue can drain.
struct InFlight {
    inner: Arc<Inner>,
    url: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.inner.lock_state();

        if std::thread::panicking() {
            state.stats.dropped += 1;
            tracing::error!("Processing {} panicked, dropping it", self.url);
        }

        state.in_flight -= 1;
        self.inner.refresh_drained(&state);
        self.inner.wakeup.notify_one();
    }
}
