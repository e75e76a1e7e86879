//! Typed errors for store operations.

use thiserror::Error;

use crate::types::{ClientId, DistributionId, UnitId, MAX_MESSAGE_LEN};

/// Top-level store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No client with the given id.
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// No distribution with the given id.
    #[error("Distribution not found: {0}")]
    DistributionNotFound(DistributionId),

    /// No delivery unit with the given id.
    #[error("Delivery unit not found: {0}")]
    UnitNotFound(UnitId),

    /// A client with this phone number already exists.
    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    /// The client is referenced by delivery units and cannot be deleted.
    #[error("Client {0} is referenced by delivery units")]
    ClientInUse(ClientId),

    /// Distribution message text exceeds [`MAX_MESSAGE_LEN`].
    #[error("Message text is {len} characters, the limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    /// Internal error (lock poisoning, backend faults).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub(crate) fn message_too_long(len: usize) -> Self {
        Self::MessageTooLong {
            len,
            max: MAX_MESSAGE_LEN,
        }
    }
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// Convenience conversion for lock poisoning
impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_too_long_reports_both_lengths() {
        let err = StoreError::message_too_long(200);
        assert_eq!(
            err.to_string(),
            "Message text is 200 characters, the limit is 160"
        );
    }

    #[test]
    fn not_found_carries_the_id() {
        let err = StoreError::UnitNotFound(UnitId(42));
        assert_eq!(err.to_string(), "Delivery unit not found: 42");
    }
}
