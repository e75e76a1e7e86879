//! Asynchronous work units and their submission seam.

use std::time::Duration;

use courier_store::{DistributionId, UnitId};

/// One unit of background work.
///
/// Jobs are self-describing by id: a job scheduled long in advance must
/// re-read its entity at execution time, never capture it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Materialize a distribution and fan out one `SendUnit` per unit.
    StartDistribution(DistributionId),
    /// Deliver a single unit through the provider.
    SendUnit(UnitId),
    /// Mail yesterday's statistics to the administrators.
    DailyReport,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartDistribution(id) => write!(f, "distribution #{id} start"),
            Self::SendUnit(id) => write!(f, "unit #{id} send"),
            Self::DailyReport => write!(f, "daily report"),
        }
    }
}

/// Where jobs are handed off for asynchronous execution.
///
/// Submission must return immediately; the caller never blocks on the work
/// itself. There is no ordering guarantee between submitted jobs beyond
/// the delays requested.
pub trait JobQueue: Send + Sync {
    /// Enqueue `job` to run after `delay`.
    fn submit(&self, job: Job, delay: Duration);
}
