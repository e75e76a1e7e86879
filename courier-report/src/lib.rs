//! Aggregate statistics and the daily administrator report.
//!
//! Everything here is a pure read over the store: per-distribution unit
//! counts, the previous-day selection, and the fixed-format text summary
//! mailed to administrators once a day.

pub mod daily;
pub mod mailer;
pub mod render;
pub mod stats;

pub use daily::{ReportConfig, ReportError, Reporter};
pub use mailer::{Mail, MailConfig, MailError, Mailer, SmtpMailer};
pub use render::render_report;
pub use stats::{stats_for, DistributionStats};
