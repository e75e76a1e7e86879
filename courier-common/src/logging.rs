//! Process-wide log subscriber setup.
//!
//! Components never hold a logger of their own; they emit `tracing` events
//! against whichever subscriber the process installed. [`init`] installs the
//! production subscriber at startup, and tests may install their own.

use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Resolve the log level from the `LOG_LEVEL` environment variable, falling
/// back to `DEBUG` for debug builds and `INFO` otherwise.
fn env_level() -> LevelFilter {
    let default = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    std::env::var("LOG_LEVEL").map_or(default, |level| {
        LevelFilter::from_str(level.as_str()).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    })
}

/// Install the process-wide subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init() {
    tracing_subscriber::Registry::default()
        .with(layer())
        .init();
}

/// Install the process-wide subscriber, returning `false` if one is already
/// installed instead of panicking.
pub fn try_init() -> bool {
    tracing_subscriber::Registry::default()
        .with(layer())
        .try_init()
        .is_ok()
}

fn layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
        .with_filter(env_level())
        .with_filter(FilterFn::new(|metadata| {
            metadata.target().starts_with("courier")
        }))
}
