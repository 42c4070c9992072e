//! Integration tests for swap execution through the public API.
//!
//! Covers the simulated venue, the HTTP gateway (via wiremock), idempotency
//! under concurrency and circuit breaking.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swap_engine::resilience::ReasonPolicy;
use swap_engine::resilience::classifier::retcode;
use swap_engine::{
    AuditEventType, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerState, DecisionId,
    ErrorCode, ExecutionService, ExecutionStatus, HttpVenue, RetryReason, RetryStrategy,
    SimulatedOutcome, SimulatedVenue, SwapRequest, VenueAdapter,
};

fn swap(decision_id: &str) -> SwapRequest {
    SwapRequest::new(decision_id, "ITSA3", "ITSA4", dec!(1000))
}

fn fast_retries() -> RetryStrategy {
    RetryStrategy::new(
        3,
        Duration::from_millis(5),
        2.0,
        Duration::from_millis(50),
    )
}

// =============================================================================
// Simulated venue
// =============================================================================

#[tokio::test(start_paused = true)]
async fn swap_fills_and_is_queryable() {
    let venue = Arc::new(SimulatedVenue::always_fill());
    let service = ExecutionService::new(venue.clone());

    let result = service
        .execute_swap(swap("decision-1").with_max_slippage(dec!(0.01)))
        .await;

    assert!(result.is_filled());
    assert_eq!(result.sell_order.as_ref().unwrap().avg_fill_price, dec!(10));
    assert_eq!(venue.requests()[0].comment.len(), "swx-SELL-".len() + 8);

    let stored = service
        .get_execution_status(&DecisionId::new("decision-1"))
        .unwrap();
    assert_eq!(stored.execution_id, result.execution_id);
    assert!(
        service
            .get_execution_status(&DecisionId::new("unknown"))
            .is_none()
    );

    let metrics = service.get_metrics();
    assert_eq!(metrics.successful_executions, 1);
    assert_eq!(metrics.success_rate, 100.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_decisions_share_one_execution() {
    let venue = Arc::new(SimulatedVenue::new(swap_engine::config::SimulatedVenueConfig {
        fill_rate: 1.0,
        price_jitter: 0.0,
        latency_ms: 25,
        seed: Some(7),
        ..Default::default()
    }));
    let service = Arc::new(ExecutionService::new(venue.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.execute_swap(swap("shared")).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let first = &results[0].execution_id;
    assert!(results.iter().all(|r| &r.execution_id == first));
    assert_eq!(venue.call_count(), 2);

    let metrics = service.get_metrics();
    assert_eq!(metrics.total_executions, 1);
    assert_eq!(metrics.cached_executions, 1);
}

#[tokio::test(start_paused = true)]
async fn shared_breaker_blocks_second_service() {
    let breaker = Arc::new(CircuitBreaker::new(
        "venue",
        CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::from_secs(300),
        },
    ));
    let failing = Arc::new(
        SimulatedVenue::always_fill().with_script([SimulatedOutcome::Retcode(retcode::NO_MONEY)]),
    );
    let healthy = Arc::new(SimulatedVenue::always_fill());

    let first = ExecutionService::new(failing).with_circuit_breaker(Arc::clone(&breaker));
    let second = ExecutionService::new(healthy.clone()).with_circuit_breaker(Arc::clone(&breaker));

    let failed = first.execute_swap(swap("a")).await;
    assert_eq!(failed.status, ExecutionStatus::Failed);
    assert_eq!(breaker.state(), CircuitBreakerState::Open);

    let refused = second.execute_swap(swap("b")).await;
    assert_eq!(
        refused.error_details.as_ref().unwrap().code(),
        ErrorCode::CircuitOpen
    );
    assert_eq!(healthy.call_count(), 0);
    assert_eq!(second.get_metrics().circuit_breaker_state, CircuitBreakerState::Open);
}

#[tokio::test(start_paused = true)]
async fn server_errors_use_their_own_retry_budget() {
    let venue = Arc::new(SimulatedVenue::always_fill().with_script([
        SimulatedOutcome::Retcode(retcode::REQUOTE),
        SimulatedOutcome::Retcode(retcode::REQUOTE),
    ]));
    let strategy = fast_retries().with_override(
        RetryReason::ServerError,
        ReasonPolicy::new(1, Duration::from_millis(10)),
    );
    let service = ExecutionService::new(venue.clone()).with_retry_strategy(strategy);

    let result = service.execute_swap(swap("requote")).await;

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(venue.call_count(), 2);
    let error = result.error_details.unwrap();
    assert_eq!(error.code(), ErrorCode::SellLegFailed);
    assert_eq!(error.context()["reason"], "SERVER_ERROR");
}

#[tokio::test(start_paused = true)]
async fn audit_trail_is_scoped_to_the_execution() {
    let venue = Arc::new(SimulatedVenue::always_fill());
    let service = ExecutionService::new(venue);

    let a = service.execute_swap(swap("a")).await;
    let b = service.execute_swap(swap("b")).await;

    assert!(
        a.audit_trail
            .iter()
            .all(|e| e.execution_id() == Some(a.execution_id.as_str()))
    );
    assert!(
        b.audit_trail
            .iter()
            .all(|e| e.execution_id() == Some(b.execution_id.as_str()))
    );
    assert_eq!(
        service.get_metrics().audit_events,
        a.audit_trail.len() + b.audit_trail.len()
    );
    assert_eq!(
        a.audit_trail.last().unwrap().event_type,
        AuditEventType::ExecutionComplete
    );
}

// =============================================================================
// HTTP venue
// =============================================================================

fn fill_body(order: u64, volume: f64, price: f64) -> serde_json::Value {
    json!({
        "retcode": 10009,
        "order": order,
        "deal": order + 100,
        "volume": volume,
        "price": price,
        "comment": "Request executed",
    })
}

#[tokio::test]
async fn swap_over_http_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order_send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fill_body(42, 1000.0, 10.5)))
        .expect(2)
        .mount(&server)
        .await;

    let venue: Arc<dyn VenueAdapter> =
        Arc::new(HttpVenue::new(&server.uri(), None, Duration::from_secs(2)).unwrap());
    let service = ExecutionService::new(venue);

    let result = service.execute_swap(swap("http-1")).await;

    assert!(result.is_filled());
    let sell = result.sell_order.as_ref().unwrap();
    assert_eq!(sell.avg_fill_price, dec!(10.5));
    assert_eq!(sell.venue_order_id, Some(42));
    assert_eq!(sell.venue_deal_id, Some(142));
    assert_eq!(result.total_filled_value, dec!(21000));
}

#[tokio::test]
async fn http_gateway_outage_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order_send"))
        .respond_with(ResponseTemplate::new(503).set_body_string("terminal restarting"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/order_send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fill_body(7, 1000.0, 10.0)))
        .mount(&server)
        .await;

    let venue: Arc<dyn VenueAdapter> =
        Arc::new(HttpVenue::new(&server.uri(), None, Duration::from_secs(2)).unwrap());
    let service = ExecutionService::new(venue).with_retry_strategy(fast_retries());

    let result = service.execute_swap(swap("http-2")).await;

    assert!(result.is_filled());
    assert_eq!(result.sell_order.as_ref().unwrap().retries_used, 1);
    assert_eq!(service.get_metrics().retry_count, 1);
}

#[tokio::test]
async fn http_gateway_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/order_send"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad symbol"))
        .expect(1)
        .mount(&server)
        .await;

    let venue: Arc<dyn VenueAdapter> =
        Arc::new(HttpVenue::new(&server.uri(), None, Duration::from_secs(2)).unwrap());
    let service = ExecutionService::new(venue).with_retry_strategy(fast_retries());

    let result = service.execute_swap(swap("http-3")).await;

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert!(result.buy_order.is_none());
    assert_eq!(
        result.sell_order.unwrap().error_details.unwrap().code(),
        ErrorCode::VenueUnavailable
    );
}
