//! Scheduling and delivery pipeline for distributions
//!
//! This crate provides functionality to:
//! - Decide, once per distribution creation, whether it fires now, later,
//!   or not at all
//! - Expand a distribution into per-client delivery units, idempotently
//! - Drive each unit through the provider transport, with bounded retry
//!   and a long-cooldown escalation when the retry budget runs out

pub mod config;
pub mod dispatcher;
mod error;
pub mod job;
pub mod materializer;
mod retry;
pub mod scheduler;
pub mod service;
pub mod transport;

pub use config::DeliveryConfig;
pub use error::{DeliveryError, PermanentError, TemporaryError};
pub use job::{Job, JobQueue};
pub use retry::RetryPolicy;
pub use scheduler::{evaluate, schedule_distribution, ScheduleDecision};
pub use service::{DeliveryService, JobReceiver};
pub use transport::{HttpTransport, Transport, TransportConfig, TransportError};
