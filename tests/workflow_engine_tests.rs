//! End-to-end transition scenarios against a mocked backend.
//!
//! These tests exercise the real REST gateway over wiremock, pinning the two
//! wire conventions (query-string GET and boolean PATCH) and the envelope
//! rules the backend follows.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opsline::config::{ApiConfig, ListRetryConfig, RateLimitConfig};
use opsline::feedback::TracingFeedback;
use opsline::workflow::types::{EntityKind, RejectReason, TransitionOutcome, TransitionRequest};
use opsline::{
    ApiClient, AutoConfirmGate, RestGateway, RetryPolicy, TransitionDispatcher, WorkflowEntity,
};

const WINDOW: Duration = Duration::from_millis(5000);

fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        token: None,
        timeout_seconds: 5,
        rate_limit: RateLimitConfig {
            requests_per_second: 50,
            burst_capacity: 50,
        },
    }
}

fn no_retry() -> RetryPolicy {
    RetryPolicy::new(&ListRetryConfig {
        max_attempts: 0,
        base_delay_ms: 1,
        max_delay_ms: 1,
    })
}

fn gateway(base_url: &str) -> Arc<RestGateway> {
    let client = ApiClient::new(&api_config(base_url)).expect("client builds");
    Arc::new(RestGateway::new(client, no_retry()))
}

fn dispatcher(base_url: &str) -> TransitionDispatcher<RestGateway, AutoConfirmGate> {
    TransitionDispatcher::new(
        gateway(base_url),
        Arc::new(AutoConfirmGate),
        Arc::new(TracingFeedback),
    )
}

fn entity(kind: EntityKind, id: u64, status: &str) -> WorkflowEntity {
    WorkflowEntity {
        id,
        kind,
        status: status.to_string(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn pending_duty_completes_over_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/duties/42/change-status"))
        .and(query_param("status", "completed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Status updated",
            "body": {
                "id": 42,
                "status": "completed",
                "updated_at": "2026-08-06T10:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Duty, 42, "pending"), "completed", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    match outcome {
        TransitionOutcome::Applied(updated) => {
            assert_eq!(updated.id, 42);
            assert_eq!(updated.status, "completed");
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[tokio::test]
async fn denied_transition_never_reaches_the_network() {
    let server = MockServer::start().await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Duty, 42, "completed"), "approved", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    assert!(matches!(
        outcome,
        TransitionOutcome::Rejected(RejectReason::InvalidTransition { .. })
    ));
    assert!(server
        .received_requests()
        .await
        .expect("request recording enabled")
        .is_empty());
}

#[tokio::test]
async fn failure_envelope_on_http_200_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leaves/9/change-status"))
        .and(query_param("status", "approved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "leave request was withdrawn",
            "body": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Leave, 9, "pending"), "approved", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    assert_eq!(
        outcome,
        TransitionOutcome::Rejected(RejectReason::ValidationError(
            "leave request was withdrawn".to_string()
        ))
    );
}

#[tokio::test]
async fn complaint_visibility_goes_out_as_a_boolean_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/complaints/7/change-status"))
        .and(body_json(json!({ "is_active": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Visibility updated",
            "body": {
                "id": 7,
                "is_active": false,
                "updated_at": "2026-08-06T10:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Complaint, 7, "visible"), "hidden", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    match outcome {
        TransitionOutcome::Applied(updated) => assert_eq!(updated.status, "hidden"),
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[tokio::test]
async fn http_500_maps_to_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/expenses/3/change-status"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Expense, 3, "pending"), "approved", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    assert!(matches!(
        outcome,
        TransitionOutcome::Rejected(RejectReason::ServerError(_))
    ));
}

#[tokio::test]
async fn server_returning_a_different_status_is_not_silently_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/duties/11/change-status"))
        .and(query_param("status", "completed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Status updated",
            "body": {
                "id": 11,
                "status": "approved",
                "updated_at": "2026-08-06T10:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server.uri());
    let request = TransitionRequest::new(&entity(EntityKind::Duty, 11, "pending"), "completed", WINDOW);
    let outcome = dispatcher.dispatch(request).await.expect("not a duplicate");

    assert!(matches!(
        outcome,
        TransitionOutcome::Rejected(RejectReason::ServerError(_))
    ));
}
