use std::fmt;

/// Counters describing everything a queue has done so far
///
/// All counters only grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Distinct URLs admitted to the queue
    pub discovered: u64,

    /// URLs ignored because they were already seen
    pub duplicates: u64,

    /// Jobs handed to the processor (first attempts and retries)
    pub dispatched: u64,

    /// Jobs that produced a result
    pub succeeded: u64,

    /// Attempts that ended in an error
    pub failed_attempts: u64,

    /// Retries put on a timer
    pub retries_scheduled: u64,

    /// Jobs abandoned, either out of retries or discarded by a shutdown
    pub dropped: u64,

    /// URLs refused because the queue was stopped
    pub rejected: u64,
}

impl fmt::Display for QueueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} duplicates, {} dispatched, {} succeeded, {} failed attempts, {} retries, {} dropped",
            self.discovered,
            self.duplicates,
            self.dispatched,
            self.succeeded,
            self.failed_attempts,
            self.retries_scheduled,
            self.dropped
        )?;
        if self.rejected > 0 {
            write!(f, ", {} rejected", self.rejected)?;
        }
        Ok(())
    }
}
