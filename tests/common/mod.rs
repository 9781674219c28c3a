//! Shared utilities for integration tests.

use async_trait::async_trait;
use faultline::diagnostics::{DiagnosticsError, DiagnosticsSink};
use faultline::DiagnosticRecord;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Start a programmable mock dependency on an ephemeral port.
///
/// `f` decides the status code and body of every response.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// HTTP client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `url`, treating non-success statuses as errors.
#[allow(dead_code)]
pub async fn fetch(client: reqwest::Client, url: String) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

/// Sink forwarding every record to a channel the test can await.
#[allow(dead_code)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DiagnosticRecord>,
}

#[allow(dead_code)]
impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<DiagnosticRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl DiagnosticsSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn write(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticsError> {
        let _ = self.tx.send(record.clone());
        Ok(())
    }
}

/// Await the next record, failing the test after a second.
#[allow(dead_code)]
pub async fn next_record(rx: &mut mpsc::UnboundedReceiver<DiagnosticRecord>) -> DiagnosticRecord {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no diagnostic record within 1s")
        .expect("diagnostics channel closed")
}
