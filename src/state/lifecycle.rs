//! Lifecycle of a scheduler's dispatch task
//!
//! A scheduler starts `Idle`, becomes `Running` when work arrives, falls back to
//! `Idle` once nothing is pending or in flight, and ends in `Stopped` only when
//! the consumer explicitly shuts it down.

use std::fmt;
use thiserror::Error;

/// Represents the current lifecycle state of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// No dispatch task is running
    #[default]
    Idle,

    /// A dispatch task is admitting jobs
    Running,

    /// Shut down for good; new work is rejected
    Stopped,
}

/// Rejected lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid lifecycle transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: Lifecycle,
    pub to: Lifecycle,
}

impl Lifecycle {
    /// Returns true if no further transitions (other than a repeated stop) are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if new jobs may still be admitted
    pub fn accepts_work(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving to `next` is a legal transition
    ///
    /// `Stopped -> Stopped` is allowed so shutdown is idempotent. Re-entering the
    /// current `Idle` or `Running` state is rejected: it would mean a second
    /// dispatch task or a lost one.
    pub fn can_transition_to(&self, next: Lifecycle) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Idle)
                | (Self::Idle, Self::Stopped)
                | (Self::Running, Self::Stopped)
                | (Self::Stopped, Self::Stopped)
        )
    }

    /// Moves to `next`, or reports why it can't
    pub fn transition_to(&mut self, next: Lifecycle) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(next) {
            return Err(InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
