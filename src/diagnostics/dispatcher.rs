//! Background delivery of trip records.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::config::DiagnosticsConfig;
use crate::diagnostics::record::DiagnosticRecord;
use crate::diagnostics::sink::{DiagnosticsError, DiagnosticsSink, TracingSink, WebhookSink};
use crate::observability::metrics;

/// Cloneable, non-blocking entry point held by every breaker.
#[derive(Debug, Clone)]
pub struct DiagnosticsHandle {
    tx: mpsc::Sender<DiagnosticRecord>,
}

impl DiagnosticsHandle {
    /// Wrap an existing queue sender.
    pub fn from_sender(tx: mpsc::Sender<DiagnosticRecord>) -> Self {
        Self { tx }
    }

    /// Queue a record for delivery.
    ///
    /// Returns `false` when the record was dropped because the queue is full or
    /// the worker has stopped.
    pub fn dispatch(&self, record: DiagnosticRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                tracing::debug!(breaker = %record.breaker_name, "Diagnostics queue full, dropping record");
                metrics::record_diagnostics_dropped("queue_full");
                false
            }
            Err(TrySendError::Closed(record)) => {
                tracing::debug!(breaker = %record.breaker_name, "Diagnostics worker stopped, dropping record");
                metrics::record_diagnostics_dropped("worker_stopped");
                false
            }
        }
    }
}

/// Worker draining the queue into the configured sinks.
pub struct DiagnosticsDispatcher {
    rx: mpsc::Receiver<DiagnosticRecord>,
    sinks: Vec<Arc<dyn DiagnosticsSink>>,
}

impl DiagnosticsDispatcher {
    /// Create a dispatcher and the handle feeding it.
    pub fn new(capacity: usize, sinks: Vec<Arc<dyn DiagnosticsSink>>) -> (Self, DiagnosticsHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { rx, sinks }, DiagnosticsHandle { tx })
    }

    /// Build the sinks described by the diagnostics config.
    pub fn from_config(config: &DiagnosticsConfig) -> Result<(Self, DiagnosticsHandle), DiagnosticsError> {
        let mut sinks: Vec<Arc<dyn DiagnosticsSink>> = Vec::new();
        if config.log_records {
            sinks.push(Arc::new(TracingSink));
        }
        if let Some(url) = &config.alert_webhook_url {
            let timeout = Duration::from_millis(config.alert_timeout_ms);
            sinks.push(Arc::new(WebhookSink::new(url, timeout)?));
        }
        Ok(Self::new(config.queue_capacity, sinks))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver records until shutdown is signalled or every handle is dropped.
    ///
    /// Records already queued when shutdown arrives are still delivered.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(sinks = self.sinks.len(), "Diagnostics dispatcher starting");

        loop {
            tokio::select! {
                record = self.rx.recv() => {
                    match record {
                        Some(record) => self.deliver(&record).await,
                        None => break,
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Diagnostics dispatcher received shutdown signal, draining queue");
                    self.rx.close();
                    while let Some(record) = self.rx.recv().await {
                        self.deliver(&record).await;
                    }
                    break;
                }
            }
        }

        tracing::info!("Diagnostics dispatcher stopped");
    }

    /// Run on a background task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn deliver(&self, record: &DiagnosticRecord) {
        for sink in &self.sinks {
            match sink.write(record).await {
                Ok(()) => metrics::record_diagnostics_delivered(sink.name(), true),
                Err(e) => {
                    tracing::debug!(
                        sink = sink.name(),
                        breaker = %record.breaker_name,
                        error = %e,
                        "Diagnostics write failed"
                    );
                    metrics::record_diagnostics_delivered(sink.name(), false);
                }
            }
        }
    }
}
