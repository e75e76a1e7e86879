//! Job bodies for distribution fan-out and single-unit delivery.

use std::time::Duration;

use chrono::{DateTime, Utc};
use courier_store::{DataStore, DeliveryStatus, DistributionId, UnitId};
use tracing::info;

use crate::{
    error::DeliveryError,
    job::{Job, JobQueue},
    materializer,
    transport::Transport,
};

/// Materialize a distribution and submit one independent send job per
/// unit.
///
/// Pre-existing pending units are resubmitted along with newly created
/// ones — a re-run after a partial failure picks up exactly where things
/// stopped, and the send job's own guards make duplicates harmless. No
/// ordering is promised between the submitted jobs.
///
/// # Errors
/// A vanished distribution is a permanent failure; store trouble during
/// materialization is temporary.
pub async fn dispatch_distribution(
    store: &dyn DataStore,
    queue: &dyn JobQueue,
    id: DistributionId,
) -> Result<(), DeliveryError> {
    let distribution = store.distribution(id).await?;

    let (units, _created) = materializer::materialize(store, &distribution).await?;
    if units.is_empty() {
        info!(distribution = %id, "No messages to send");
    } else {
        info!(distribution = %id, count = units.len(), "Start sending messages");
    }

    for unit in &units {
        queue.submit(Job::SendUnit(unit.id), Duration::ZERO);
    }

    Ok(())
}

/// Deliver a single unit through the provider.
///
/// Terminal no-ops, in check order:
/// - the distribution's window has closed (`now > end_at`) — the message
///   is simply not sent anymore;
/// - the unit is already `Sent` — a duplicate or retried job finds the
///   work done.
///
/// Otherwise the provider is called, and only its explicit acceptance
/// flips the unit to `Sent`. That status write is this job's alone; a
/// failure leaves the unit pending for the retry to find.
///
/// # Errors
/// Missing entities are permanent; provider failures are temporary.
pub async fn dispatch_unit(
    store: &dyn DataStore,
    transport: &dyn Transport,
    id: UnitId,
    now: DateTime<Utc>,
) -> Result<(), DeliveryError> {
    let unit = store.unit(id).await?;
    let distribution = store.distribution(unit.distribution_id).await?;

    if now > distribution.end_at {
        info!(
            unit = %id,
            distribution = %distribution.id,
            "Sending aborted, distribution has already ended"
        );
        return Ok(());
    }

    if unit.status == DeliveryStatus::Sent {
        return Ok(());
    }

    let client = store.client(unit.client_id).await?;

    transport
        .send(&distribution.message_text, &client.phone, id)
        .await?;

    store.mark_unit_sent(id).await?;
    info!(unit = %id, client = %client.id, "Sent successfully");

    Ok(())
}
