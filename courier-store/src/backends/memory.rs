use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::{Result, StoreError},
    r#trait::DataStore,
    types::{
        Client, ClientId, DeliveryStatus, DeliveryUnit, Distribution, DistributionId, NewClient,
        NewDistribution, NewUser, RecipientFilter, UnitId, User, UserId, MAX_MESSAGE_LEN,
    },
};

#[derive(Debug, Default)]
struct Tables {
    clients: HashMap<ClientId, Client>,
    /// Phone uniqueness index: phone -> owning client.
    phones: HashMap<String, ClientId>,
    distributions: HashMap<DistributionId, Distribution>,
    units: HashMap<UnitId, DeliveryUnit>,
    /// Pair uniqueness index. Kept in lockstep with `units` under the same
    /// lock; this is what makes `insert_unit_if_absent` atomic.
    pairs: HashMap<(DistributionId, ClientId), UnitId>,
    users: HashMap<UserId, User>,
    next_client: u64,
    next_distribution: u64,
    next_unit: u64,
    next_user: u64,
}

/// In-memory store implementation.
///
/// All tables live in one `HashMap`-per-entity structure behind a single
/// `RwLock`, so cross-table invariants (phone uniqueness, pair uniqueness,
/// the reference checks on delete) hold without any further coordination.
/// Intended for tests and single-process deployments; durable backends
/// implement the same trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of delivery units currently stored, across distributions.
    ///
    /// Recovers gracefully if the lock is poisoned by reading through the
    /// poison marker.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .units
            .len()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn add_client(&self, client: NewClient) -> Result<Client> {
        let mut tables = self.tables.write()?;

        if tables.phones.contains_key(&client.phone) {
            return Err(StoreError::DuplicatePhone(client.phone));
        }

        tables.next_client += 1;
        let id = ClientId(tables.next_client);
        let client = Client {
            id,
            phone: client.phone,
            operator_code: client.operator_code,
            tag: client.tag,
            tz_offset_hours: client.tz_offset_hours,
        };

        tables.phones.insert(client.phone.clone(), id);
        tables.clients.insert(id, client.clone());

        Ok(client)
    }

    async fn update_client(&self, client: Client) -> Result<()> {
        let mut tables = self.tables.write()?;

        let Some(existing) = tables.clients.get(&client.id).cloned() else {
            return Err(StoreError::ClientNotFound(client.id));
        };

        if existing.phone != client.phone {
            if tables.phones.contains_key(&client.phone) {
                return Err(StoreError::DuplicatePhone(client.phone));
            }
            tables.phones.remove(&existing.phone);
            tables.phones.insert(client.phone.clone(), client.id);
        }

        tables.clients.insert(client.id, client);
        Ok(())
    }

    async fn remove_client(&self, id: ClientId) -> Result<()> {
        let mut tables = self.tables.write()?;

        if !tables.clients.contains_key(&id) {
            return Err(StoreError::ClientNotFound(id));
        }
        if tables.units.values().any(|unit| unit.client_id == id) {
            return Err(StoreError::ClientInUse(id));
        }

        if let Some(client) = tables.clients.remove(&id) {
            tables.phones.remove(&client.phone);
        }
        Ok(())
    }

    async fn client(&self, id: ClientId) -> Result<Client> {
        self.tables
            .read()?
            .clients
            .get(&id)
            .cloned()
            .ok_or(StoreError::ClientNotFound(id))
    }

    async fn clients_matching(&self, filter: &RecipientFilter) -> Result<Vec<Client>> {
        let tables = self.tables.read()?;

        let mut clients: Vec<Client> = tables
            .clients
            .values()
            .filter(|client| filter.matches(client))
            .cloned()
            .collect();
        clients.sort_by_key(|client| client.id);

        Ok(clients)
    }

    async fn add_distribution(&self, distribution: NewDistribution) -> Result<Distribution> {
        let len = distribution.message_text.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(StoreError::message_too_long(len));
        }

        let mut tables = self.tables.write()?;

        tables.next_distribution += 1;
        let id = DistributionId(tables.next_distribution);
        let distribution = Distribution {
            id,
            start_at: distribution.start_at,
            end_at: distribution.end_at,
            message_text: distribution.message_text,
            filter: distribution.filter,
        };

        tables.distributions.insert(id, distribution.clone());
        Ok(distribution)
    }

    async fn distribution(&self, id: DistributionId) -> Result<Distribution> {
        self.tables
            .read()?
            .distributions
            .get(&id)
            .cloned()
            .ok_or(StoreError::DistributionNotFound(id))
    }

    async fn remove_distribution(&self, id: DistributionId) -> Result<()> {
        let mut tables = self.tables.write()?;

        if tables.distributions.remove(&id).is_none() {
            return Err(StoreError::DistributionNotFound(id));
        }

        // Cascade: units never outlive their distribution.
        tables.units.retain(|_, unit| unit.distribution_id != id);
        tables.pairs.retain(|(distribution, _), _| *distribution != id);

        Ok(())
    }

    async fn distributions_started_within(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Distribution>> {
        let tables = self.tables.read()?;

        let mut distributions: Vec<Distribution> = tables
            .distributions
            .values()
            .filter(|distribution| distribution.start_at >= from && distribution.start_at < to)
            .cloned()
            .collect();
        distributions.sort_by_key(|distribution| distribution.id);

        Ok(distributions)
    }

    async fn insert_unit_if_absent(
        &self,
        distribution: DistributionId,
        client: ClientId,
    ) -> Result<Option<DeliveryUnit>> {
        let mut tables = self.tables.write()?;

        if !tables.distributions.contains_key(&distribution) {
            return Err(StoreError::DistributionNotFound(distribution));
        }
        if !tables.clients.contains_key(&client) {
            return Err(StoreError::ClientNotFound(client));
        }
        if tables.pairs.contains_key(&(distribution, client)) {
            return Ok(None);
        }

        tables.next_unit += 1;
        let unit = DeliveryUnit {
            id: UnitId(tables.next_unit),
            created_at: Utc::now(),
            status: DeliveryStatus::Pending,
            distribution_id: distribution,
            client_id: client,
        };

        tables.pairs.insert((distribution, client), unit.id);
        tables.units.insert(unit.id, unit.clone());

        Ok(Some(unit))
    }

    async fn unit(&self, id: UnitId) -> Result<DeliveryUnit> {
        self.tables
            .read()?
            .units
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnitNotFound(id))
    }

    async fn units_for_clients(
        &self,
        distribution: DistributionId,
        clients: &[ClientId],
    ) -> Result<Vec<DeliveryUnit>> {
        let tables = self.tables.read()?;

        let mut units: Vec<DeliveryUnit> = clients
            .iter()
            .filter_map(|client| tables.pairs.get(&(distribution, *client)))
            .filter_map(|id| tables.units.get(id))
            .cloned()
            .collect();
        units.sort_by_key(|unit| unit.id);

        Ok(units)
    }

    async fn mark_unit_sent(&self, id: UnitId) -> Result<()> {
        let mut tables = self.tables.write()?;

        let Some(unit) = tables.units.get_mut(&id) else {
            return Err(StoreError::UnitNotFound(id));
        };

        unit.status = DeliveryStatus::Sent;
        Ok(())
    }

    async fn unit_counts(&self, distribution: DistributionId) -> Result<(usize, usize)> {
        let tables = self.tables.read()?;

        let mut total = 0;
        let mut sent = 0;
        for unit in tables.units.values() {
            if unit.distribution_id == distribution {
                total += 1;
                if unit.status == DeliveryStatus::Sent {
                    sent += 1;
                }
            }
        }

        Ok((total, sent))
    }

    async fn add_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write()?;

        tables.next_user += 1;
        let user = User {
            id: UserId(tables.next_user),
            email: user.email,
            is_admin: user.is_admin,
        };

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn admin_emails(&self) -> Result<Vec<String>> {
        let tables = self.tables.read()?;

        let mut admins: Vec<&User> = tables.users.values().filter(|user| user.is_admin).collect();
        admins.sort_by_key(|user| user.id);

        Ok(admins.iter().map(|user| user.email.clone()).collect())
    }
}
