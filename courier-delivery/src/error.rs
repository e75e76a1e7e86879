//! Typed error handling for dispatch jobs.
//!
//! The split drives the retry supervisor: permanent failures abort a job
//! immediately, everything else counts against its retry budget.

use courier_report::ReportError;
use courier_store::{ClientId, DistributionId, StoreError, UnitId};
use thiserror::Error;

use crate::transport::TransportError;

/// Top-level dispatch error type.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Failure that retrying cannot fix; the job is abandoned.
    #[error("Permanent failure: {0}")]
    Permanent(#[from] PermanentError),

    /// Failure that is expected to clear up; the job is retried.
    #[error("Temporary failure: {0}")]
    Temporary(#[from] TemporaryError),
}

/// Failures caused by an entity disappearing between scheduling and
/// execution. The referenced row is gone; no amount of retrying brings it
/// back.
#[derive(Debug, Error)]
pub enum PermanentError {
    #[error("Distribution does not exist: {0}")]
    DistributionNotFound(DistributionId),

    #[error("Delivery unit does not exist: {0}")]
    UnitNotFound(UnitId),

    #[error("Client does not exist: {0}")]
    ClientNotFound(ClientId),
}

/// Failures worth another attempt.
#[derive(Debug, Error)]
pub enum TemporaryError {
    /// The provider rejected or never received the message.
    #[error("Provider request failed: {0}")]
    Transport(#[from] TransportError),

    /// The data store misbehaved (excluding not-found, which is permanent).
    #[error("Store operation failed: {0}")]
    Store(String),

    /// The daily report could not be assembled or delivered.
    #[error("Report failed: {0}")]
    Report(String),
}

impl DeliveryError {
    /// Returns `true` if the job should be abandoned rather than retried.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// Returns `true` if the job should be retried.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

/// Missing entities become permanent failures; every other store problem
/// is assumed transient.
impl From<StoreError> for DeliveryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DistributionNotFound(id) => {
                Self::Permanent(PermanentError::DistributionNotFound(id))
            }
            StoreError::UnitNotFound(id) => Self::Permanent(PermanentError::UnitNotFound(id)),
            StoreError::ClientNotFound(id) => Self::Permanent(PermanentError::ClientNotFound(id)),
            other => Self::Temporary(TemporaryError::Store(other.to_string())),
        }
    }
}

impl From<TransportError> for DeliveryError {
    fn from(error: TransportError) -> Self {
        Self::Temporary(TemporaryError::Transport(error))
    }
}

/// Report failures are retried as a whole, so they are always temporary.
impl From<ReportError> for DeliveryError {
    fn from(error: ReportError) -> Self {
        Self::Temporary(TemporaryError::Report(error.to_string()))
    }
}
