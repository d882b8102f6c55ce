/// One unit of work: fetch and summarize a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// The URL as discovered
    pub url: String,

    /// Zero for the first try, incremented for every retry
    pub attempt: u32,
}

impl Job {
    /// Creates a first-attempt job
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attempt: 0,
        }
    }

    /// Returns the job to enqueue when this attempt failed
    pub fn next_attempt(&self) -> Self {
        Self {
            url: self.url.clone(),
            attempt: self.attempt + 1,
        }
    }

    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }
}
