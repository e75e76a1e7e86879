//! Idempotent expansion of a distribution into delivery units.

use courier_store::{DataStore, DeliveryUnit, Distribution, StoreError};
use tracing::debug;

/// Resolve the distribution's recipients and ensure one pending unit per
/// (distribution, client) pair.
///
/// Returns the full current unit set for the resolved clients and whether
/// this call created any new units. Pairs that already exist are silently
/// kept, which makes the call safe to repeat and safe to race: the store's
/// insert-if-absent primitive is the only synchronization involved.
///
/// Recipients are resolved at call time. Clients whose attributes changed
/// since an earlier materialization keep their existing units; nothing is
/// ever removed here.
///
/// # Errors
/// Propagates store failures; a vanished distribution surfaces as
/// `StoreError::DistributionNotFound` from the insert.
pub async fn materialize(
    store: &dyn DataStore,
    distribution: &Distribution,
) -> Result<(Vec<DeliveryUnit>, bool), StoreError> {
    let clients = store.clients_matching(&distribution.filter).await?;

    let mut created_any = false;
    for client in &clients {
        if store
            .insert_unit_if_absent(distribution.id, client.id)
            .await?
            .is_some()
        {
            created_any = true;
        }
    }

    let client_ids: Vec<_> = clients.iter().map(|client| client.id).collect();
    let units = store.units_for_clients(distribution.id, &client_ids).await?;

    debug!(
        distribution = %distribution.id,
        units = units.len(),
        created_any,
        "Materialized delivery units"
    );

    Ok((units, created_any))
}
