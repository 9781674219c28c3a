//! Diagnostics sinks.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::diagnostics::record::DiagnosticRecord;

/// Errors raised by a sink. They never leave the dispatcher.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// Transport-level failure talking to an alerting endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("alert endpoint returned status {0}")]
    Status(u16),

    /// Invalid sink configuration.
    #[error("invalid sink configuration: {0}")]
    Config(String),
}

/// Destination for trip records.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    /// Short identifier used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn write(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticsError>;
}

/// Append-only diagnostics log built on `tracing`.
///
/// Records go to the `faultline::diagnostics` target so they can be routed to
/// their own file or collector by the subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl DiagnosticsSink for TracingSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn write(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticsError> {
        tracing::warn!(
            target: "faultline::diagnostics",
            id = %record.id,
            breaker = %record.breaker_name,
            consecutive_failures = record.consecutive_failures,
            threshold = record.threshold,
            last_error = %record.last_error,
            cooldown_ms = record.cooldown_ms,
            trips = record.trips,
            occurred_at = record.occurred_at,
            "Circuit breaker opened"
        );
        Ok(())
    }
}

/// Alerting sink posting each record as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: Url,
}

impl WebhookSink {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DiagnosticsError> {
        let url = Url::parse(url)
            .map_err(|e| DiagnosticsError::Config(format!("webhook URL '{}': {}", url, e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl DiagnosticsSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn write(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticsError> {
        let response = self.client.post(self.url.clone()).json(record).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DiagnosticsError::Status(status.as_u16()));
        }
        Ok(())
    }
}
