//! Cancellation of in-flight attempts and pending backoff.

use crate::integration::mock_server::{MockServerFixture, SilentServer};
use englishapp_api::client::RetryConfig;
use englishapp_api::ApiClient;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_cancel_aborts_in_flight_attempt() {
    let server = SilentServer::start().await;
    let client = ApiClient::builder()
        .base_url(&server.base_url)
        .request_timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let scoped = client.with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let start = Instant::now();
    let err = scoped.list_topics().await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(5));
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let server = SilentServer::start().await;
    let client = ApiClient::builder()
        .base_url(&server.base_url)
        .build()
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = client
        .with_cancellation(token)
        .get_article(1)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.connections(), 0);
}

#[tokio::test]
async fn test_cancel_interrupts_backoff_sleep() {
    let mut fixture = MockServerFixture::new().await;
    let _unavailable = fixture.mock_json("GET", "/topics", 503, "", 4).await;

    let token = CancellationToken::new();
    let client = fixture
        .builder()
        .retry(RetryConfig::default().with_backoff(2.0, Duration::from_secs(30)))
        .cancellation_token(token.clone())
        .build()
        .unwrap();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let start = Instant::now();
    let err = client.list_topics().await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(10));
    canceller.await.unwrap();
}
