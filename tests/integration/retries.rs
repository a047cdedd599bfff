//! Retry behavior of the request executor, end to end.

use crate::integration::mock_server::{fast_retry, DripServer, MockServerFixture, SilentServer};
use englishapp_api::client::{Decision, Outcome, RetryConfig, RetryStrategy};
use englishapp_api::types::TopicsData;
use englishapp_api::{ApiClient, ApiError, Endpoint, Error, TransportErrorKind};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_transient_503_then_success() {
    let mut fixture = MockServerFixture::new().await;
    let unavailable = fixture.mock_json("GET", "/topics", 503, "", 2).await;
    let ok = fixture
        .mock_json("GET", "/topics", 200, r#"{"data":{"topics":[]}}"#, 1)
        .await;

    let client = fixture.client();
    let (topics, stats) = client
        .call_with_stats(Endpoint::<TopicsData>::get("/topics"))
        .await
        .unwrap();

    assert!(topics.topics.is_empty());
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.http_status, Some(200));
    unavailable.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_structured_404_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json(
            "GET",
            "/articles/999",
            404,
            r#"{"error":{"code":404,"message":"not found"}}"#,
            1,
        )
        .await;

    let err = fixture.client().get_article(999).await.unwrap_err();
    match err {
        Error::Api(ApiError { code, message }) => {
            assert_eq!(code, 404);
            assert_eq!(message, "not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bad_request_makes_exactly_one_attempt() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/topics", 400, "bad request", 1).await;

    let err = fixture.client().list_topics().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 400 }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_persistent_500_stops_at_retry_limit() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json(
            "GET",
            "/topics",
            500,
            r#"{"error":{"code":500,"message":"database unavailable"}}"#,
            3,
        )
        .await;

    let client = fixture
        .builder()
        .retry(fast_retry().with_retry_limit(2))
        .build()
        .unwrap();
    let err = client.list_topics().await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.user_message(), "database unavailable");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_disabled_retries_surface_first_failure() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/topics", 502, "", 1).await;

    let client = fixture.builder().retry(RetryConfig::disabled()).build().unwrap();
    assert!(matches!(
        client.list_topics().await,
        Err(Error::HttpStatus { status: 502 })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_timeouts_exhaust_retry_limit() {
    let server = SilentServer::start().await;
    let client = ApiClient::builder()
        .base_url(&server.base_url)
        .request_timeout(Duration::from_millis(100))
        .retry(fast_retry())
        .build()
        .unwrap();

    let err = client.list_topics().await.unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Timeout));
    assert_eq!(server.connections(), 4);
}

#[tokio::test]
async fn test_slow_body_hits_resource_timeout_and_is_retried() {
    let server = DripServer::start(Duration::from_millis(100)).await;
    let client = ApiClient::builder()
        .base_url(&server.base_url)
        .request_timeout(Duration::from_millis(200))
        .resource_timeout(Duration::from_millis(500))
        .retry(fast_retry().with_retry_limit(1))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.list_topics().await.unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Timeout));
    assert_eq!(server.connections(), 2);
    // Two attempts, each cut off by the resource timeout well before the body completes.
    assert!(start.elapsed() < Duration::from_millis(100) * DripServer::BODY_LEN as u32);
}

#[tokio::test]
async fn test_backoff_does_not_block_other_calls() {
    let mut fixture = MockServerFixture::new().await;
    let _unavailable = fixture.mock_json("GET", "/topics", 503, "", 4).await;
    let article = fixture
        .mock_json(
            "GET",
            "/articles/1",
            200,
            r#"{"data":{"article":{"id":1,"image_url":"https://cdn.example.com/a1.jpg","content":"Hi","title":"Greetings","level":"A1","minutes":1,"vocabulary":[],"rules":[]}}}"#,
            1,
        )
        .await;

    let token = CancellationToken::new();
    let client = fixture
        .builder()
        .retry(RetryConfig::default().with_backoff(2.0, Duration::from_secs(1)))
        .cancellation_token(token.clone())
        .build()
        .unwrap();

    let stuck = client.clone();
    let topics = tokio::spawn(async move { stuck.list_topics().await });
    // Let the first 503 arrive so the call is sleeping in backoff.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let start = Instant::now();
    let fetched = client.get_article(1).await.unwrap();
    assert_eq!(fetched.title, "Greetings");
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!topics.is_finished());

    token.cancel();
    let err = topics.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    article.assert_async().await;
}

/// Records every decision request and never retries.
#[derive(Default)]
struct RecordingStrategy {
    seen: Mutex<Vec<(Outcome, u32)>>,
}

impl RetryStrategy for RecordingStrategy {
    fn decide(&self, outcome: Outcome, attempt: u32) -> Decision {
        self.seen.lock().unwrap().push((outcome, attempt));
        Decision::Stop
    }
}

#[tokio::test]
async fn test_custom_strategy_is_consulted() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/topics", 503, "", 1).await;

    let strategy = Arc::new(RecordingStrategy::default());
    let client = fixture
        .builder()
        .retry_strategy(strategy.clone())
        .build()
        .unwrap();

    assert!(matches!(
        client.list_topics().await,
        Err(Error::HttpStatus { status: 503 })
    ));
    assert_eq!(
        *strategy.seen.lock().unwrap(),
        vec![(Outcome::Status(503), 1)]
    );
    mock.assert_async().await;
}
