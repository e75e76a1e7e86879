//! Entity model and data store for the courier distribution service.
//!
//! The store is a plain CRUD surface behind the [`DataStore`] trait; the one
//! piece of behavior it owns is the uniqueness of a (distribution, client)
//! pair, exposed as [`DataStore::insert_unit_if_absent`]. That single
//! insert-if-absent primitive is what makes materializing a distribution
//! safely retriable without any external locking.

pub mod backends;
pub mod error;
pub mod r#trait;
pub mod types;

pub use backends::MemoryStore;
pub use error::{Result, StoreError};
pub use r#trait::DataStore;
pub use types::{
    Client, ClientId, DeliveryStatus, DeliveryUnit, Distribution, DistributionId, NewClient,
    NewDistribution, NewUser, RecipientFilter, UnitId, User, UserId, MAX_MESSAGE_LEN,
};
