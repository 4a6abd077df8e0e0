//! Integration tests for the snapshot request and its retry policies,
//! against an in-process backend.

mod common;

use std::time::Duration;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use common::{signal_json, MockServer};
use market_monitor::error::{HttpError, SdkError};
use market_monitor::http::{RetryConfig, RetryPolicy};
use market_monitor::prelude::MonitorClient;
use market_monitor::shared::Backoff;

fn snapshot() -> serde_json::Value {
    json!([
        signal_json("2024-05-01T12:00:02", 90.0, -2.8, "Drop"),
        signal_json("2024-05-01T12:00:01", 100.0, 3.1, "Spike"),
    ])
}

fn quick_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy::Custom(RetryConfig {
        max_retries,
        backoff: Backoff {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            factor: 2.0,
            jitter: false,
        },
        ..RetryConfig::default()
    })
}

fn client_for(server: &MockServer, retry: RetryPolicy) -> MonitorClient {
    MonitorClient::builder()
        .base_url(&server.api_url())
        .ws_url(&server.ws_url())
        .bootstrap_retry(retry)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_retries_exhausted_on_persistent_503() {
    let server = MockServer::start(200, snapshot()).await;
    server.fail_next(usize::MAX, 503);
    let client = client_for(&server, quick_retries(2));

    let err = assert_err!(client.signals().recent(50).await);
    match err {
        SdkError::Http(HttpError::MaxRetriesExceeded {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("503"), "last error: {last_error}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.snapshot_requests(), 3);
}

#[tokio::test]
async fn test_transient_503_recovers() {
    let server = MockServer::start(200, snapshot()).await;
    server.fail_next(2, 503);
    let client = client_for(&server, quick_retries(3));

    let signals = assert_ok!(client.signals().recent(50).await);
    assert_eq!(signals.len(), 2);
    assert_eq!(server.snapshot_requests(), 3);
}

#[tokio::test]
async fn test_non_retryable_status_fails_immediately() {
    let server = MockServer::start(200, snapshot()).await;
    server.fail_next(1, 404);
    let client = client_for(&server, quick_retries(3));

    let err = assert_err!(client.signals().recent(50).await);
    assert!(matches!(err, SdkError::Http(HttpError::NotFound(_))), "{err:?}");
    assert_eq!(server.snapshot_requests(), 1);
}

#[tokio::test]
async fn test_default_policy_does_not_retry() {
    let server = MockServer::start(200, snapshot()).await;
    server.fail_next(1, 503);
    let client = client_for(&server, RetryPolicy::None);

    let err = assert_err!(client.signals().recent(50).await);
    assert!(
        matches!(err, SdkError::Http(HttpError::ServerError { status: 503, .. })),
        "{err:?}"
    );
    assert_eq!(server.snapshot_requests(), 1);
}

#[tokio::test]
async fn test_idempotent_policy_retries_rate_limit() {
    let server = MockServer::start(200, snapshot()).await;
    server.fail_next(1, 429);
    let client = client_for(&server, RetryPolicy::Idempotent);

    let signals = assert_ok!(client.signals().recent(50).await);
    assert_eq!(signals.len(), 2);
    assert_eq!(server.snapshot_requests(), 2);
}

#[tokio::test]
async fn test_non_array_body_is_a_decode_error() {
    let server = MockServer::start(200, json!({"not": "an array"})).await;
    let client = client_for(&server, quick_retries(3));

    let err = assert_err!(client.signals().recent(50).await);
    assert!(matches!(err, SdkError::Http(HttpError::Decode(_))), "{err:?}");
    assert_eq!(server.snapshot_requests(), 1);
}

#[tokio::test]
async fn test_invalid_element_fails_the_whole_fetch() {
    let server = MockServer::start(
        200,
        json!([
            signal_json("2024-05-01T12:00:01", 100.0, 3.1, "Spike"),
            signal_json("2024-05-01T12:00:02", 90.0, 0.4, "Flat"),
        ]),
    )
    .await;
    let client = client_for(&server, RetryPolicy::None);

    let err = assert_err!(client.signals().recent(50).await);
    match err {
        SdkError::Validation(msg) => assert!(msg.contains("Unknown signal type: Flat"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
