//! Per-distribution delivery counters.

use courier_store::{DataStore, DistributionId, StoreError};
use serde::Serialize;

/// Delivery counters for one distribution.
///
/// `total == sent + not_sent` always holds; the three numbers come from a
/// single consistent read of the unit rows, never from a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionStats {
    pub id: DistributionId,
    pub total: usize,
    pub sent: usize,
    pub not_sent: usize,
}

/// Compute the current counters for a distribution.
///
/// # Errors
///
/// Propagates store failures; a distribution with no units yields all
/// zeroes rather than an error.
pub async fn stats_for(
    store: &dyn DataStore,
    id: DistributionId,
) -> Result<DistributionStats, StoreError> {
    let (total, sent) = store.unit_counts(id).await?;

    Ok(DistributionStats {
        id,
        total,
        sent,
        not_sent: total - sent,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use courier_store::{
        DataStore, MemoryStore, NewClient, NewDistribution, RecipientFilter,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn counters_always_balance() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let distribution = store
            .add_distribution(NewDistribution {
                start_at: now,
                end_at: now + TimeDelta::hours(1),
                message_text: "hello".to_string(),
                filter: RecipientFilter::default(),
            })
            .await
            .unwrap();

        let mut units = Vec::new();
        for n in 0..5 {
            let client = store
                .add_client(NewClient {
                    phone: format!("7900123456{n}"),
                    operator_code: "900".to_string(),
                    tag: String::new(),
                    tz_offset_hours: 0,
                })
                .await
                .unwrap();
            units.push(
                store
                    .insert_unit_if_absent(distribution.id, client.id)
                    .await
                    .unwrap()
                    .unwrap(),
            );
        }

        store.mark_unit_sent(units[0].id).await.unwrap();
        store.mark_unit_sent(units[1].id).await.unwrap();

        let stats = stats_for(&store, distribution.id).await.unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.not_sent, 3);
        assert_eq!(stats.total, stats.sent + stats.not_sent);
    }

    #[tokio::test]
    async fn empty_distribution_is_all_zeroes() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let distribution = store
            .add_distribution(NewDistribution {
                start_at: now,
                end_at: now + TimeDelta::hours(1),
                message_text: "hello".to_string(),
                filter: RecipientFilter::default(),
            })
            .await
            .unwrap();

        let stats = stats_for(&store, distribution.id).await.unwrap();
        assert_eq!(
            stats,
            DistributionStats {
                id: distribution.id,
                total: 0,
                sent: 0,
                not_sent: 0,
            }
        );
    }
}
