//! The storage abstraction the delivery pipeline runs against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    types::{
        Client, ClientId, DeliveryUnit, Distribution, DistributionId, NewClient, NewDistribution,
        NewUser, RecipientFilter, UnitId, User,
    },
};

/// CRUD surface over the persisted entities.
///
/// Backends are expected to uphold three durable rules the rest of the
/// system relies on:
///
/// - clients are unique by phone number;
/// - at most one delivery unit exists per (distribution, client) pair;
/// - a client referenced by any unit cannot be deleted, while deleting a
///   distribution removes its units with it.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Register a new client.
    ///
    /// # Errors
    /// `DuplicatePhone` if the phone number is already registered.
    async fn add_client(&self, client: NewClient) -> Result<Client>;

    /// Replace a client's mutable fields.
    ///
    /// Existing delivery units are unaffected; a client's units belong to
    /// whatever distributions materialized them, not to its current
    /// operator code or tag.
    async fn update_client(&self, client: Client) -> Result<()>;

    /// Delete a client.
    ///
    /// # Errors
    /// `ClientInUse` while any delivery unit references the client.
    async fn remove_client(&self, id: ClientId) -> Result<()>;

    async fn client(&self, id: ClientId) -> Result<Client>;

    /// All clients matching the filter, in id order.
    async fn clients_matching(&self, filter: &RecipientFilter) -> Result<Vec<Client>>;

    /// Create a distribution.
    ///
    /// # Errors
    /// `MessageTooLong` if the text exceeds [`crate::MAX_MESSAGE_LEN`].
    async fn add_distribution(&self, distribution: NewDistribution) -> Result<Distribution>;

    async fn distribution(&self, id: DistributionId) -> Result<Distribution>;

    /// Delete a distribution and, with it, all of its delivery units.
    async fn remove_distribution(&self, id: DistributionId) -> Result<()>;

    /// Distributions with `start_at` in the half-open range `[from, to)`.
    async fn distributions_started_within(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Distribution>>;

    /// Create a pending delivery unit for the pair unless one already
    /// exists. Returns the new unit, or `None` if the pair was present.
    ///
    /// This is the concurrency-safety boundary for materialization: the
    /// pair uniqueness check and the insert are one atomic step, so
    /// concurrent or repeated materialization of the same distribution can
    /// never produce duplicate units. Callers must not wrap this in
    /// additional locking.
    async fn insert_unit_if_absent(
        &self,
        distribution: DistributionId,
        client: ClientId,
    ) -> Result<Option<DeliveryUnit>>;

    async fn unit(&self, id: UnitId) -> Result<DeliveryUnit>;

    /// All units of the distribution whose client is in `clients`, in id
    /// order.
    async fn units_for_clients(
        &self,
        distribution: DistributionId,
        clients: &[ClientId],
    ) -> Result<Vec<DeliveryUnit>>;

    /// Record a confirmed delivery. The transition is one-way and
    /// idempotent: marking an already-sent unit is a no-op.
    async fn mark_unit_sent(&self, id: UnitId) -> Result<()>;

    /// `(total, sent)` unit counts for the distribution.
    async fn unit_counts(&self, distribution: DistributionId) -> Result<(usize, usize)>;

    /// Register a new user.
    async fn add_user(&self, user: NewUser) -> Result<User>;

    /// Email addresses of all users flagged as administrators.
    async fn admin_emails(&self) -> Result<Vec<String>>;
}
