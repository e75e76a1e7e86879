//! The one-shot scheduling decision for a newly created distribution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use courier_store::Distribution;
use tracing::info;

use crate::job::{Job, JobQueue};

/// What to do with a distribution at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// The window is open: dispatch right away.
    Immediate,
    /// The window opens later: dispatch after the delay.
    Deferred(Duration),
    /// The window is already closed (or inverted): never dispatch.
    Skipped,
}

/// Classify a delivery window against the current time.
///
/// An inverted window (`start > end`) falls through to `Skipped`, the same
/// as a window that has already passed.
#[must_use]
pub fn evaluate(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleDecision {
    if start <= now && now <= end {
        ScheduleDecision::Immediate
    } else if now <= start && start <= end {
        let delay = (start - now).to_std().unwrap_or_default();
        ScheduleDecision::Deferred(delay)
    } else {
        ScheduleDecision::Skipped
    }
}

/// Apply the scheduling decision for a distribution that was just created.
///
/// Submits at most one `StartDistribution` job. This runs once, on
/// creation only — updates never reschedule, and a skipped distribution is
/// never revisited.
pub fn schedule_distribution(
    queue: &dyn JobQueue,
    distribution: &Distribution,
    now: DateTime<Utc>,
) -> ScheduleDecision {
    let decision = evaluate(now, distribution.start_at, distribution.end_at);

    match decision {
        ScheduleDecision::Immediate => {
            queue.submit(Job::StartDistribution(distribution.id), Duration::ZERO);
        }
        ScheduleDecision::Deferred(delay) => {
            info!(
                distribution = %distribution.id,
                start = %distribution.start_at,
                "Distribution will start at {}",
                distribution.start_at
            );
            queue.submit(Job::StartDistribution(distribution.id), delay);
        }
        ScheduleDecision::Skipped => {
            info!(distribution = %distribution.id, "Distribution will not be started");
        }
    }

    decision
}
