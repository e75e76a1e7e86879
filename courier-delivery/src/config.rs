//! Delivery pipeline configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::retry::RetryPolicy;

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_secs() -> u64 {
    60 // 1 minute
}

const fn default_report_retry_delay_secs() -> u64 {
    120 // 2 minutes
}

const fn default_escalation_delay_secs() -> u64 {
    3600 // 1 hour
}

/// Retry and escalation settings for the job runner.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Executions allowed per submission before a job escalates.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts of distribution-start and unit-send jobs
    /// (in seconds).
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Pause between attempts of the daily report job (in seconds).
    #[serde(default = "default_report_retry_delay_secs")]
    pub report_retry_delay_secs: u64,

    /// Cooldown before an exhausted distribution/unit job is resubmitted
    /// (in seconds).
    #[serde(default = "default_escalation_delay_secs")]
    pub escalation_delay_secs: u64,

    /// Upper bound on resubmissions of the same job.
    ///
    /// Default: none — an exhausted job keeps coming back every cooldown
    /// until it succeeds or the entity disappears. Every escalation is
    /// logged at error level, so a persistently failing provider is at
    /// least visible in the logs.
    #[serde(default)]
    pub max_escalations: Option<u32>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            report_retry_delay_secs: default_report_retry_delay_secs(),
            escalation_delay_secs: default_escalation_delay_secs(),
            max_escalations: None,
        }
    }
}

impl DeliveryConfig {
    /// Policy for distribution-start and unit-send jobs.
    #[must_use]
    pub fn dispatch_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            escalation_delay: Some(Duration::from_secs(self.escalation_delay_secs)),
            max_escalations: self.max_escalations,
        }
    }

    /// Policy for the daily report job: same attempt budget, a longer
    /// pause, and no escalation — a missed report is stale the next day.
    #[must_use]
    pub fn report_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.report_retry_delay_secs),
            escalation_delay: None,
            max_escalations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = DeliveryConfig::default();

        let dispatch = config.dispatch_policy();
        assert_eq!(dispatch.max_attempts, 3);
        assert_eq!(dispatch.retry_delay, Duration::from_secs(60));
        assert_eq!(dispatch.escalation_delay, Some(Duration::from_secs(3600)));
        assert_eq!(dispatch.max_escalations, None);

        let report = config.report_policy();
        assert_eq!(report.retry_delay, Duration::from_secs(120));
        assert_eq!(report.escalation_delay, None);
    }
}
