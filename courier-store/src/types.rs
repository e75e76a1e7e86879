//! Persisted entity shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on distribution message text, in characters.
///
/// Matches the single-part GSM message budget the provider accepts.
pub const MAX_MESSAGE_LEN: usize = 160;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a registered client.
    ClientId
);
id_type!(
    /// Identifier of a distribution.
    DistributionId
);
id_type!(
    /// Identifier of a single delivery unit.
    UnitId
);
id_type!(
    /// Identifier of a service user.
    UserId
);

/// A registered message recipient.
///
/// Unique by phone number. Referenced, never owned, by delivery units: the
/// store refuses to delete a client while any unit points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Phone number in `7XXXXXXXXXX` form.
    pub phone: String,
    /// Mobile operator code, up to three digits.
    pub operator_code: String,
    /// Free-form grouping tag. Empty means untagged.
    pub tag: String,
    /// Whole-hour offset from UTC, e.g. `2` or `-5`.
    pub tz_offset_hours: i8,
}

/// Client fields supplied at creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub phone: String,
    #[serde(default)]
    pub operator_code: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub tz_offset_hours: i8,
}

/// Equality filters selecting the recipients of a distribution.
///
/// Both filters are ANDed; an empty string places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFilter {
    #[serde(default)]
    pub operator_code: String,
    #[serde(default)]
    pub tag: String,
}

impl RecipientFilter {
    #[must_use]
    pub fn matches(&self, client: &Client) -> bool {
        (self.operator_code.is_empty() || client.operator_code == self.operator_code)
            && (self.tag.is_empty() || client.tag == self.tag)
    }
}

/// A bulk-message campaign with a delivery window and recipient filter.
///
/// Owns its delivery units: deleting a distribution cascades to them.
/// Mutation after creation never re-triggers scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: DistributionId,
    /// When delivery may begin.
    pub start_at: DateTime<Utc>,
    /// Messages are not delivered after this time.
    pub end_at: DateTime<Utc>,
    pub message_text: String,
    #[serde(default)]
    pub filter: RecipientFilter,
}

/// Distribution fields supplied at creation; the store assigns the id.
///
/// The store does not require `start_at <= end_at`; an inverted window is
/// accepted and such a distribution simply never runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDistribution {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub message_text: String,
    #[serde(default)]
    pub filter: RecipientFilter,
}

/// Delivery state of a single unit.
///
/// The only transition is `Pending` to `Sent`, performed exactly once after
/// the provider confirms acceptance. It is never reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Sent,
}

/// One (distribution, client) pairing: a single message to deliver.
///
/// At most one unit exists per pair; the store enforces this. Units are
/// never deleted individually, only through their distribution's cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryUnit {
    pub id: UnitId,
    pub created_at: DateTime<Utc>,
    pub status: DeliveryStatus,
    pub distribution_id: DistributionId,
    pub client_id: ClientId,
}

/// A service user. Admins receive the daily statistics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
}

/// User fields supplied at creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}
