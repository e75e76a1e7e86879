//! Service configuration.
//!
//! One TOML file configures the whole process. Entity management has no
//! API surface here, so the `[seed]` section is how a deployment gets its
//! initial clients, users, and distributions; seeded distributions go
//! through the same post-create scheduling as any other.

use std::path::Path;

use courier_delivery::{DeliveryConfig, TransportConfig};
use courier_report::{MailConfig, ReportConfig};
use courier_store::{NewClient, NewDistribution, NewUser};
use serde::Deserialize;

/// Entities created at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub clients: Vec<NewClient>,

    #[serde(default)]
    pub users: Vec<NewUser>,

    #[serde(default)]
    pub distributions: Vec<NewDistribution>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Provider connection; the only section without defaults.
    pub transport: TransportConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub seed: Seed,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// If the file doesn't exist, is not readable, or is not valid
    /// configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
