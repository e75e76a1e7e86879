//! Process wiring for the courier distribution service.

pub mod config;

use std::sync::Arc;

use courier_common::Signal;
use courier_delivery::{DeliveryService, HttpTransport};
use courier_report::{Reporter, SmtpMailer};
use courier_store::{DataStore, MemoryStore};
use tokio::sync::broadcast;
use tracing::{error, info};

pub use config::{Config, Seed};

/// Build every component, seed the store, and run until a shutdown
/// signal arrives.
///
/// # Errors
///
/// Fails on transport construction or on invalid seed data; a running
/// service only ever stops through the shutdown signal.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let transport = Arc::new(HttpTransport::new(&config.transport)?);
    let mailer = Arc::new(SmtpMailer::new(config.mail.clone()));
    let reporter = Arc::new(Reporter::new(mailer, config.report.clone()));

    let (service, jobs) = DeliveryService::new(
        Arc::clone(&store),
        transport,
        reporter,
        &config.delivery,
    );

    let (shutdown, _) = broadcast::channel(1);
    let serve = tokio::spawn(Arc::clone(&service).serve(jobs, shutdown.subscribe()));
    let timer = tokio::spawn(Arc::clone(&service).report_timer(shutdown.subscribe()));

    seed(store.as_ref(), &service, &config.seed).await?;

    info!("Courier is running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    if shutdown.send(Signal::Shutdown).is_err() {
        error!("Shutdown channel closed before the signal was sent");
    }
    let _ = serve.await;
    let _ = timer.await;

    Ok(())
}

/// Create the configured entities, scheduling each seeded distribution
/// exactly as a freshly created one.
async fn seed(
    store: &dyn DataStore,
    service: &DeliveryService,
    seed: &Seed,
) -> anyhow::Result<()> {
    for client in &seed.clients {
        let client = store.add_client(client.clone()).await?;
        info!(client = %client.id, "Client created");
    }

    for user in &seed.users {
        let user = store.add_user(user.clone()).await?;
        info!(user = %user.id, admin = user.is_admin, "User created");
    }

    for distribution in &seed.distributions {
        let distribution = store.add_distribution(distribution.clone()).await?;
        info!(distribution = %distribution.id, "Distribution created");
        service.distribution_created(&distribution);
    }

    Ok(())
}
