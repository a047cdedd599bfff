//! Mock HTTP server setup for integration tests

use englishapp_api::client::RetryConfig;
use englishapp_api::{ApiClient, ApiClientBuilder};
use mockito::{Mock, Server, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default retry rules with millisecond backoff so tests stay fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig::default().with_backoff(2.0, Duration::from_millis(1))
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        init_tracing();
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointed at the mock server with fast retries.
    pub fn builder(&self) -> ApiClientBuilder {
        ApiClient::builder()
            .base_url(&self.base_url)
            .retry(fast_retry())
    }

    pub fn client(&self) -> ApiClient {
        self.builder().build().expect("client builds")
    }

    /// Create a mock answering `hits` times with a JSON body
    pub async fn mock_json(
        &mut self,
        method: &str,
        path: &str,
        status: usize,
        body: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}

/// A TCP server that accepts connections and never answers.
pub struct SilentServer {
    pub base_url: String,
    accepted: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl SilentServer {
    pub async fn start() -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        let task = tokio::spawn(async move {
            // Hold sockets open so clients see silence rather than a reset.
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(socket);
            }
        });
        Self {
            base_url: format!("http://{}", addr),
            accepted,
            task,
        }
    }

    pub fn connections(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A TCP server that answers headers at once, then sends the body one byte per `interval`.
pub struct DripServer {
    pub base_url: String,
    accepted: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl DripServer {
    pub const BODY_LEN: usize = 64;

    pub async fn start(interval: Duration) -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        let task = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let head = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
                        Self::BODY_LEN
                    );
                    if socket.write_all(head.as_bytes()).await.is_err() {
                        return;
                    }
                    for _ in 0..Self::BODY_LEN {
                        tokio::time::sleep(interval).await;
                        if socket.write_all(b" ").await.is_err() {
                            return;
                        }
                    }
                });
            }
        });
        Self {
            base_url: format!("http://{}", addr),
            accepted,
            task,
        }
    }

    pub fn connections(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for DripServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
