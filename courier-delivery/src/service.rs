//! The delivery service: job intake, supervised execution, timers.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use courier_common::Signal;
use courier_report::Reporter;
use courier_store::{DataStore, Distribution};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::{
    config::DeliveryConfig,
    dispatcher,
    error::DeliveryError,
    job::{Job, JobQueue},
    retry::RetryPolicy,
    scheduler::{self, ScheduleDecision},
    transport::Transport,
};

/// A job together with its execution delay and escalation history.
#[derive(Debug, Clone, Copy)]
struct ScheduledJob {
    job: Job,
    delay: Duration,
    /// How many times this job has already exhausted a full attempt
    /// budget and been resubmitted.
    escalations: u32,
}

/// Receiving end of the job channel, passed to [`DeliveryService::serve`].
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<ScheduledJob>,
}

/// Executes dispatch jobs as independent tokio tasks.
///
/// Submitting work never blocks: jobs go through an unbounded channel and
/// the serve loop spawns one task per job. Each task sleeps out its delay,
/// then runs the job body under the retry policy for its job class.
pub struct DeliveryService {
    store: Arc<dyn DataStore>,
    transport: Arc<dyn Transport>,
    reporter: Arc<Reporter>,
    dispatch_policy: RetryPolicy,
    report_policy: RetryPolicy,
    tx: mpsc::UnboundedSender<ScheduledJob>,
}

impl DeliveryService {
    /// Build the service and the receiver its serve loop will drain.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        transport: Arc<dyn Transport>,
        reporter: Arc<Reporter>,
        config: &DeliveryConfig,
    ) -> (Arc<Self>, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();

        let service = Arc::new(Self {
            store,
            transport,
            reporter,
            dispatch_policy: config.dispatch_policy(),
            report_policy: config.report_policy(),
            tx,
        });

        (service, JobReceiver { rx })
    }

    /// The post-create scheduling step for a distribution.
    ///
    /// Call exactly once, right after the distribution is stored; updates
    /// must not call this again. Submits at most one job and returns
    /// immediately — the caller never waits on delivery.
    pub fn distribution_created(&self, distribution: &Distribution) -> ScheduleDecision {
        scheduler::schedule_distribution(self, distribution, Utc::now())
    }

    /// Drain job submissions until shutdown.
    ///
    /// Each submission becomes a detached task. Tasks still sleeping or
    /// mid-flight when the loop exits die with the runtime; every job body
    /// is written to make that harmless (status guards, window expiry).
    pub async fn serve(
        self: Arc<Self>,
        mut jobs: JobReceiver,
        mut shutdown: broadcast::Receiver<Signal>,
    ) {
        info!("Delivery service starting");

        loop {
            tokio::select! {
                submission = jobs.rx.recv() => {
                    let Some(scheduled) = submission else { break };
                    let service = Arc::clone(&self);
                    tokio::spawn(async move {
                        service.run_scheduled(scheduled).await;
                    });
                }
                _ = shutdown.recv() => {
                    info!("Delivery service received shutdown signal");
                    break;
                }
            }
        }

        info!("Delivery service stopped");
    }

    /// Fire the daily report job at the configured hour, every day, until
    /// shutdown.
    pub async fn report_timer(self: Arc<Self>, mut shutdown: broadcast::Receiver<Signal>) {
        let hour = self.reporter.hour();
        info!(hour, "Report timer starting");

        loop {
            let delay = until_next_hour(Utc::now(), hour);
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    self.submit(Job::DailyReport, Duration::ZERO);
                }
                _ = shutdown.recv() => {
                    info!("Report timer received shutdown signal");
                    break;
                }
            }
        }
    }

    async fn run_scheduled(&self, scheduled: ScheduledJob) {
        if !scheduled.delay.is_zero() {
            tokio::time::sleep(scheduled.delay).await;
        }

        let policy = self.policy_for(scheduled.job);
        let mut attempts = 0;

        loop {
            let error = match self.run_job(scheduled.job).await {
                Ok(()) => return,
                Err(error) if error.is_permanent() => {
                    error!(job = %scheduled.job, %error, "Job aborted");
                    return;
                }
                Err(error) => error,
            };

            attempts += 1;
            if policy.should_retry(attempts) {
                warn!(
                    job = %scheduled.job,
                    attempt = attempts,
                    %error,
                    "Job failed, next attempt in {}s",
                    policy.retry_delay.as_secs()
                );
                tokio::time::sleep(policy.retry_delay).await;
                continue;
            }

            // Out of attempts: escalate with a fresh budget, or give up.
            match policy.escalate_after(scheduled.escalations) {
                Some(cooldown) => {
                    error!(
                        job = %scheduled.job,
                        escalation = scheduled.escalations + 1,
                        %error,
                        "Shifted, too many retries; resubmitting in {}s",
                        cooldown.as_secs()
                    );
                    self.resubmit(ScheduledJob {
                        job: scheduled.job,
                        delay: cooldown,
                        escalations: scheduled.escalations + 1,
                    });
                }
                None if policy.escalation_delay.is_some() => {
                    error!(
                        job = %scheduled.job,
                        escalations = scheduled.escalations,
                        %error,
                        "Escalation limit reached, giving up"
                    );
                }
                None => {
                    error!(job = %scheduled.job, %error, "Aborted, too many retries");
                }
            }
            return;
        }
    }

    async fn run_job(&self, job: Job) -> Result<(), DeliveryError> {
        match job {
            Job::StartDistribution(id) => {
                dispatcher::dispatch_distribution(self.store.as_ref(), self, id).await
            }
            Job::SendUnit(id) => {
                dispatcher::dispatch_unit(self.store.as_ref(), self.transport.as_ref(), id, Utc::now())
                    .await
            }
            Job::DailyReport => self
                .reporter
                .send_daily_report(self.store.as_ref(), Utc::now())
                .await
                .map_err(DeliveryError::from),
        }
    }

    const fn policy_for(&self, job: Job) -> &RetryPolicy {
        match job {
            Job::StartDistribution(_) | Job::SendUnit(_) => &self.dispatch_policy,
            Job::DailyReport => &self.report_policy,
        }
    }

    fn resubmit(&self, scheduled: ScheduledJob) {
        if self.tx.send(scheduled).is_err() {
            warn!(job = %scheduled.job, "Job resubmission dropped, service is shutting down");
        }
    }
}

impl JobQueue for DeliveryService {
    fn submit(&self, job: Job, delay: Duration) {
        let scheduled = ScheduledJob {
            job,
            delay,
            escalations: 0,
        };
        if self.tx.send(scheduled).is_err() {
            warn!(job = %job, "Job submission dropped, service is shutting down");
        }
    }
}

/// Time until the next occurrence of `hour:00` UTC, strictly in the
/// future.
fn until_next_hour(now: DateTime<Utc>, hour: u32) -> Duration {
    let today = now
        .date_naive()
        .and_hms_opt(hour.min(23), 0, 0)
        .unwrap_or_else(|| now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default())
        .and_utc();

    let target = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };

    (target - now).to_std().unwrap_or_default()
}
