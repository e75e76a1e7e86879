//! The daily report job body.

use chrono::{DateTime, TimeDelta, Utc};
use courier_store::{DataStore, StoreError};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{
    mailer::{Mail, MailError, Mailer},
    render::render_report,
    stats::stats_for,
};

const REPORT_SUBJECT: &str = "Daily distribution report";

/// Errors from assembling or delivering the daily report.
///
/// All of them are transient from the scheduler's point of view: the job is
/// retried as a whole.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Report delivery failed: {0}")]
    Mail(#[from] MailError),
}

/// Daily report settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Hour of day (UTC) at which the report job fires.
    #[serde(default = "default_hour")]
    pub hour: u32,

    /// Sender address on the report mail.
    #[serde(default = "default_from")]
    pub from: String,
}

const fn default_hour() -> u32 {
    9
}

fn default_from() -> String {
    "courier@localhost".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hour: default_hour(),
            from: default_from(),
        }
    }
}

/// Assembles the previous-day summary and mails it to administrators.
pub struct Reporter {
    mailer: std::sync::Arc<dyn Mailer>,
    config: ReportConfig,
}

impl Reporter {
    #[must_use]
    pub fn new(mailer: std::sync::Arc<dyn Mailer>, config: ReportConfig) -> Self {
        Self { mailer, config }
    }

    /// Hour of day (UTC) the report is scheduled for.
    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.config.hour
    }

    /// Send stats for every distribution started within the 24 hours before
    /// `now` to all administrators.
    ///
    /// Having no administrators is not an error: the report is skipped with
    /// a log line.
    ///
    /// # Errors
    /// Store and mail failures propagate for the caller to retry.
    pub async fn send_daily_report(
        &self,
        store: &dyn DataStore,
        now: DateTime<Utc>,
    ) -> Result<(), ReportError> {
        info!("Sending daily report to admins");

        let admins = store.admin_emails().await?;
        if admins.is_empty() {
            info!("No admins found to send daily report");
            return Ok(());
        }

        let distributions = store
            .distributions_started_within(now - TimeDelta::days(1), now)
            .await?;

        let mut stats = Vec::with_capacity(distributions.len());
        for distribution in &distributions {
            stats.push(stats_for(store, distribution.id).await?);
        }

        let admin_count = admins.len();
        self.mailer
            .send(&Mail {
                subject: REPORT_SUBJECT.to_string(),
                body: render_report(&stats),
                from: self.config.from.clone(),
                recipients: admins,
            })
            .await?;

        info!(admins = admin_count, "Daily report sent to admins");
        Ok(())
    }
}
