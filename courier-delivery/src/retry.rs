//! Retry policy for dispatch jobs.
//!
//! A clean abstraction over the retry parameters, so attempt accounting
//! can be reasoned about (and tested) apart from the job runner.

use std::time::Duration;

/// Retry behavior for one class of job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total executions allowed per submission before escalating.
    pub max_attempts: u32,

    /// Fixed pause between consecutive attempts.
    pub retry_delay: Duration,

    /// Cooldown before the job is resubmitted with a fresh attempt budget
    /// once `max_attempts` is spent. `None` means the job is abandoned
    /// instead.
    pub escalation_delay: Option<Duration>,

    /// Upper bound on resubmissions. `None` keeps escalating forever.
    pub max_escalations: Option<u32>,
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempts` failures.
    #[must_use]
    pub const fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// The cooldown before resubmission, if the policy escalates and the
    /// count of escalations so far is still under the cap.
    #[must_use]
    pub fn escalate_after(&self, escalations: u32) -> Option<Duration> {
        let delay = self.escalation_delay?;
        match self.max_escalations {
            Some(cap) if escalations >= cap => None,
            _ => Some(delay),
        }
    }
}
