//! Provider transport for outbound messages.
//!
//! The provider is a black box: one POST per message, and only an
//! affirmative acknowledgement counts as delivered. Network errors,
//! non-2xx statuses, and 2xx answers without the confirmation are all the
//! same retryable failure to the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use courier_store::UnitId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from a provider send.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never completed (connect, timeout, body decode).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered outside the 2xx range.
    #[error("Provider returned status {status}")]
    Status { status: u16 },

    /// A 2xx answer whose payload did not confirm acceptance.
    #[error("Provider did not confirm acceptance: {answer:?}")]
    NotAccepted { answer: String },
}

/// Outbound message transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one message. `Ok(())` means the provider explicitly accepted
    /// it; any error leaves the unit eligible for retry.
    async fn send(&self, text: &str, phone: &str, unit: UnitId) -> Result<(), TransportError>;
}

/// Provider connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the provider API, e.g. `https://probe.example.com/v1`.
    pub base_url: String,

    /// Bearer token attached to every request.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout (in seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Serialize)]
struct SendRequest<'a> {
    id: u64,
    phone: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    message: String,
}

/// HTTP implementation of [`Transport`] against the provider API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport from its configuration.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, text: &str, phone: &str, unit: UnitId) -> Result<(), TransportError> {
        let url = format!("{}/send/{unit}", self.base_url);
        debug!(unit = %unit, url = %url, "Submitting message to the provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&SendRequest {
                id: unit.0,
                phone,
                text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let answer: SendResponse = response.json().await?;
        if answer.message != "OK" {
            return Err(TransportError::NotAccepted {
                answer: answer.message,
            });
        }

        debug!(unit = %unit, "Provider accepted the message");
        Ok(())
    }
}
