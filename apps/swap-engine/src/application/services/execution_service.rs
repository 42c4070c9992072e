//! Swap Execution Service
//!
//! Orchestrates a two-leg swap against the venue:
//!
//! 1. Idempotency: one result per decision ID, concurrent duplicates wait
//! 2. Circuit breaker gate before any venue traffic
//! 3. Sell leg, then a buy leg sized to what the sell leg filled
//! 4. Per-leg retries with per-reason budgets and exponential backoff
//! 5. Audit trail, counters and Prometheus metrics for every swap
//!
//! `execute_swap` never returns an error: every failure is reported in the
//! result's `status` and `error_details`.
//!
//! Each swap runs on its own task. Dropping the caller's future does not stop
//! a swap that has started; its result still lands in the idempotency cache.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::{Map, Value, json};
use tokio::time::Instant;
use tracing::Instrument;

use super::audit_log::{AuditExportError, AuditLog, details};
use super::execution_metrics::{ExecutionCounters, MetricsSnapshot, success_rate};
use super::idempotency::IdempotencyRegistry;
use crate::application::ports::{VenueAdapter, VenueError, VenueResponse};
use crate::config::Config;
use crate::domain::execution::{
    AuditEvent, AuditEventType, ExecutionResult, ExecutionStatus, SwapRequest,
};
use crate::domain::order::{
    DEFAULT_MAX_SLIPPAGE, DEFAULT_ORDER_TIMEOUT, OrderRequest, OrderResult, OrderSide,
};
use crate::domain::shared::{DecisionId, ExecutionId, OrderId};
use crate::error::{ErrorCode, ExecutionError};
use crate::observability;
use crate::resilience::{
    CircuitBreaker, CircuitBreakerConfig, RetryReason, RetryStrategy, classifier,
};

/// Name of the breaker guarding the venue.
pub const VENUE_BREAKER: &str = "venue";

/// Service name written into audit exports.
const SERVICE_NAME: &str = "swap-engine";

/// Default number of events in an audit export.
const DEFAULT_AUDIT_EXPORT_LIMIT: usize = 1000;

/// What one venue attempt amounted to.
enum AttemptOutcome {
    /// Venue accepted the order.
    Accepted(VenueResponse),
    /// Permanent venue rejection.
    Rejected(ExecutionError),
    /// Permanent transport failure.
    Failed(ExecutionError),
    /// Failure worth retrying.
    Retryable(RetryReason, ExecutionError),
}

/// Timing of one leg.
struct LegClock {
    submitted_at: DateTime<Utc>,
    started: Instant,
}

impl LegClock {
    fn start() -> Self {
        Self {
            submitted_at: Utc::now(),
            started: Instant::now(),
        }
    }
}

/// Collaborators a swap needs, cheap to clone into a spawned task.
#[derive(Clone)]
struct SwapWorker {
    venue: Arc<dyn VenueAdapter>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry_strategy: RetryStrategy,
    order_timeout: Duration,
    default_max_slippage: Decimal,
    audit_log: Arc<AuditLog>,
    counters: Arc<ExecutionCounters>,
}

/// Service executing idempotent two-leg swaps.
pub struct ExecutionService {
    worker: SwapWorker,
    audit_export_limit: usize,
    executions: IdempotencyRegistry,
}

impl std::fmt::Debug for ExecutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionService")
            .field("venue", &self.worker.venue.name())
            .field("circuit_breaker", &self.worker.circuit_breaker.metrics())
            .field("retry_strategy", &self.worker.retry_strategy)
            .field("order_timeout", &self.worker.order_timeout)
            .field("cached_executions", &self.executions.len())
            .finish_non_exhaustive()
    }
}

impl ExecutionService {
    /// Create a service with default retry, breaker and timeout settings.
    #[must_use]
    pub fn new(venue: Arc<dyn VenueAdapter>) -> Self {
        Self {
            worker: SwapWorker {
                venue,
                circuit_breaker: Arc::new(CircuitBreaker::new(
                    VENUE_BREAKER,
                    CircuitBreakerConfig::default(),
                )),
                retry_strategy: RetryStrategy::default(),
                order_timeout: DEFAULT_ORDER_TIMEOUT,
                default_max_slippage: DEFAULT_MAX_SLIPPAGE,
                audit_log: Arc::new(AuditLog::new()),
                counters: Arc::new(ExecutionCounters::default()),
            },
            audit_export_limit: DEFAULT_AUDIT_EXPORT_LIMIT,
            executions: IdempotencyRegistry::new(),
        }
    }

    /// Create a service from loaded configuration.
    #[must_use]
    pub fn from_config(venue: Arc<dyn VenueAdapter>, config: &Config) -> Self {
        Self::new(venue)
            .with_retry_strategy(config.execution.retry.to_strategy())
            .with_circuit_breaker(Arc::new(CircuitBreaker::new(
                VENUE_BREAKER,
                config.circuit_breaker.to_resilience_config(),
            )))
            .with_order_timeout(config.execution.order_timeout())
            .with_default_max_slippage(config.execution.max_slippage())
            .with_audit_export_limit(config.audit.export_limit)
    }

    /// Replace the retry strategy.
    #[must_use]
    pub fn with_retry_strategy(mut self, retry_strategy: RetryStrategy) -> Self {
        self.worker.retry_strategy = retry_strategy;
        self
    }

    /// Replace the circuit breaker, e.g. to share one across services.
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.worker.circuit_breaker = circuit_breaker;
        self
    }

    /// Set the per-attempt venue timeout.
    #[must_use]
    pub const fn with_order_timeout(mut self, order_timeout: Duration) -> Self {
        self.worker.order_timeout = order_timeout;
        self
    }

    /// Set the slippage used when a request carries none.
    #[must_use]
    pub const fn with_default_max_slippage(mut self, max_slippage: Decimal) -> Self {
        self.worker.default_max_slippage = max_slippage;
        self
    }

    /// Set how many recent events an audit export contains.
    #[must_use]
    pub const fn with_audit_export_limit(mut self, limit: usize) -> Self {
        self.audit_export_limit = limit;
        self
    }

    /// The shared circuit breaker.
    #[must_use]
    pub const fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.worker.circuit_breaker
    }

    /// The active retry strategy.
    #[must_use]
    pub const fn retry_strategy(&self) -> &RetryStrategy {
        &self.worker.retry_strategy
    }

    /// Execute a swap: sell `sell_symbol`, then buy `buy_symbol`.
    ///
    /// A decision ID that already has a result gets that result back without
    /// any venue traffic. Invalid requests fail with `INVALID_REQUEST` and are
    /// not cached, so a corrected request may reuse the decision ID.
    ///
    /// Must be called from within a Tokio runtime.
    #[tracing::instrument(skip_all, fields(decision_id = %request.decision_id))]
    pub async fn execute_swap(&self, request: SwapRequest) -> ExecutionResult {
        let started = Instant::now();
        let execution_id = ExecutionId::for_decision(&request.decision_id);

        if let Err(error) = request.validate() {
            return self.worker.reject_invalid(&request, execution_id, error, started);
        }

        let slot = self.executions.slot(&request.decision_id);
        let cached = slot.get().cloned();
        let result = if let Some(cached) = cached {
            cached
        } else {
            // The task owns the slot, so the cell is filled even if this
            // caller goes away mid-swap.
            let worker = self.worker.clone();
            let owned = request.clone();
            let fresh_id = execution_id.clone();
            let task = tokio::spawn(
                async move {
                    slot.get_or_init(|| worker.run_swap(&owned, fresh_id, started))
                        .await
                        .clone()
                }
                .in_current_span(),
            );

            match task.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => {
                    tracing::error!(error = %err, "Swap task cancelled");
                    return ExecutionResult::not_executed(
                        request.decision_id.clone(),
                        execution_id,
                        ExecutionError::new(
                            ErrorCode::VenueUnavailable,
                            format!("swap task cancelled: {err}"),
                        ),
                        started.elapsed(),
                        Vec::new(),
                    );
                }
            }
        };

        if result.execution_id != execution_id {
            self.log_audit_event(
                AuditEventType::ExecutionIdempotent,
                details(json!({
                    "decision_id": request.decision_id,
                    "execution_id": result.execution_id,
                    "status": result.status,
                })),
            );
            tracing::info!(
                execution_id = %result.execution_id,
                status = %result.status.as_label(),
                "Returning cached execution"
            );
        }

        result
    }

    /// Result previously produced for a decision, if any.
    #[must_use]
    pub fn get_execution_status(&self, decision_id: &DecisionId) -> Option<ExecutionResult> {
        self.executions.get(decision_id)
    }

    /// Snapshot of counters, breaker state and cache sizes.
    #[must_use]
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let (total, successful, failed, retries) = self.worker.counters.load();
        let breaker = self.worker.circuit_breaker.metrics();

        MetricsSnapshot {
            total_executions: total,
            successful_executions: successful,
            failed_executions: failed,
            retry_count: retries,
            success_rate: success_rate(successful, total),
            circuit_breaker_state: breaker.state,
            circuit_breaker_failures: breaker.failure_count,
            circuit_breaker_trips: breaker.trips,
            cached_executions: self.executions.len(),
            audit_events: self.worker.audit_log.len(),
        }
    }

    /// Append an event to the audit log and return it.
    pub fn log_audit_event(
        &self,
        event_type: AuditEventType,
        details: Map<String, Value>,
    ) -> AuditEvent {
        self.worker.log_audit_event(event_type, details)
    }

    /// Copy of the full audit log, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> Vec<AuditEvent> {
        self.worker.audit_log.snapshot()
    }

    /// Write metadata, metrics and the most recent audit events to `path`.
    pub fn export_audit_log(&self, path: impl AsRef<Path>) -> Result<(), AuditExportError> {
        let path = path.as_ref();
        let document = json!({
            "metadata": {
                "timestamp": Utc::now(),
                "version": env!("CARGO_PKG_VERSION"),
                "service": SERVICE_NAME,
            },
            "metrics": self.get_metrics(),
            "audit_log": self.worker.audit_log.tail(self.audit_export_limit),
        });

        AuditLog::write_json(path, &document)?;
        tracing::info!(path = %path.display(), "Audit log exported");
        Ok(())
    }

    /// Drive one order through the venue until it fills, is rejected, or
    /// runs out of retries.
    pub async fn execute_order_with_retry(
        &self,
        order: &OrderRequest,
        execution_id: &ExecutionId,
    ) -> OrderResult {
        self.worker.execute_order_with_retry(order, execution_id).await
    }
}

impl SwapWorker {
    fn log_audit_event(&self, event_type: AuditEventType, details: Map<String, Value>) -> AuditEvent {
        self.audit_log.record(event_type, details)
    }

    async fn execute_order_with_retry(
        &self,
        order: &OrderRequest,
        execution_id: &ExecutionId,
    ) -> OrderResult {
        let clock = LegClock::start();
        let wire = order.to_wire_request();
        let mut attempt: u32 = 0;

        loop {
            self.log_audit_event(
                AuditEventType::OrderAttempt,
                details(json!({
                    "execution_id": execution_id,
                    "order_id": order.order_id(),
                    "symbol": order.symbol(),
                    "side": order.side(),
                    "quantity": order.quantity().to_string(),
                    "attempt": attempt,
                })),
            );
            observability::record_order_attempt(order.side().as_label());

            let outcome = match tokio::time::timeout(order.timeout(), self.venue.submit(&wire)).await
            {
                Ok(Ok(response)) => Self::classify_response(order, response),
                Ok(Err(err)) => Self::classify_error(err),
                Err(_) => {
                    self.log_audit_event(
                        AuditEventType::OrderTimeout,
                        details(json!({
                            "execution_id": execution_id,
                            "order_id": order.order_id(),
                            "attempt": attempt,
                            "timeout_ms": order.timeout().as_millis() as u64,
                        })),
                    );
                    AttemptOutcome::Retryable(
                        RetryReason::Timeout,
                        ExecutionError::new(
                            ErrorCode::VenueTimeout,
                            format!("no venue answer within {:?}", order.timeout()),
                        ),
                    )
                }
            };

            let (reason, error) = match outcome {
                AttemptOutcome::Accepted(response) => {
                    return self.accept_fill(order, execution_id, &response, attempt, &clock);
                }
                AttemptOutcome::Rejected(error) => {
                    return self.fail_leg(
                        order,
                        execution_id,
                        ExecutionStatus::Rejected,
                        error,
                        attempt,
                        &clock,
                    );
                }
                AttemptOutcome::Failed(error) => {
                    return self.fail_leg(
                        order,
                        execution_id,
                        ExecutionStatus::Failed,
                        error,
                        attempt,
                        &clock,
                    );
                }
                AttemptOutcome::Retryable(reason, error) => (reason, error),
            };

            if !self.retry_strategy.should_retry(attempt, reason) {
                let exhausted = ExecutionError::new(
                    ErrorCode::RetriesExhausted,
                    format!("retries exhausted: {}", error.message()),
                )
                .with_context("reason", reason)
                .with_context("attempts", attempt + 1)
                .with_context("last_error_code", error.code());
                return self.fail_leg(
                    order,
                    execution_id,
                    ExecutionStatus::Failed,
                    exhausted,
                    attempt,
                    &clock,
                );
            }

            let delay = self.retry_strategy.get_delay(attempt, reason);
            self.counters.record_retry();
            observability::record_order_retry(reason.as_label());
            self.log_audit_event(
                AuditEventType::OrderRetry,
                details(json!({
                    "execution_id": execution_id,
                    "order_id": order.order_id(),
                    "attempt": attempt,
                    "reason": reason,
                    "delay_ms": delay.as_millis() as u64,
                    "error": error.to_string(),
                })),
            );
            tracing::warn!(
                order_id = %order.order_id(),
                attempt,
                reason = %reason,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying order"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn run_swap(
        &self,
        request: &SwapRequest,
        execution_id: ExecutionId,
        started: Instant,
    ) -> ExecutionResult {
        let max_slippage = request.max_slippage.unwrap_or(self.default_max_slippage);

        // 1. Record the start
        self.log_audit_event(
            AuditEventType::ExecutionStart,
            details(json!({
                "decision_id": request.decision_id,
                "execution_id": execution_id,
                "sell_symbol": request.sell_symbol,
                "buy_symbol": request.buy_symbol,
                "quantity": request.quantity.to_string(),
                "max_slippage": max_slippage.to_string(),
            })),
        );
        tracing::info!(
            execution_id = %execution_id,
            sell = %request.sell_symbol,
            buy = %request.buy_symbol,
            quantity = %request.quantity,
            "Starting swap"
        );

        // 2. Circuit breaker gate
        if !self.circuit_breaker.can_execute() {
            self.log_audit_event(
                AuditEventType::ExecutionCircuitOpen,
                details(json!({
                    "decision_id": request.decision_id,
                    "execution_id": execution_id,
                    "circuit_state": self.circuit_breaker.state(),
                    "failure_count": self.circuit_breaker.failure_count(),
                })),
            );
            observability::record_circuit_breaker_rejected(self.circuit_breaker.name());
            tracing::warn!(execution_id = %execution_id, "Circuit breaker open, swap refused");

            let result = ExecutionResult::not_executed(
                request.decision_id.clone(),
                execution_id,
                ExecutionError::circuit_open(),
                started.elapsed(),
                Vec::new(),
            );
            return self.finalize(result, started);
        }

        // 3. Sell leg
        let sell = OrderRequest::market(
            OrderId::for_leg(&execution_id, OrderSide::Sell),
            &request.sell_symbol,
            OrderSide::Sell,
            request.quantity,
        )
        .with_max_slippage(max_slippage)
        .with_timeout(self.order_timeout);
        let sell_result = self.execute_order_with_retry(&sell, &execution_id).await;

        // 4. Buy leg, sized to what was actually sold
        let buy_result = if sell_result.is_success() {
            let buy = OrderRequest::market(
                OrderId::for_leg(&execution_id, OrderSide::Buy),
                &request.buy_symbol,
                OrderSide::Buy,
                sell_result.filled_quantity,
            )
            .with_max_slippage(max_slippage)
            .with_timeout(self.order_timeout);
            Some(self.execute_order_with_retry(&buy, &execution_id).await)
        } else {
            None
        };

        let result = ExecutionResult::from_legs(
            request.decision_id.clone(),
            execution_id,
            sell_result,
            buy_result,
            started.elapsed(),
        );

        // 5. Report to the breaker, once per swap
        if result.status.is_success() {
            self.circuit_breaker.on_success();
        } else {
            self.circuit_breaker.on_failure();
        }

        let event_type = match result.status {
            ExecutionStatus::Filled => AuditEventType::ExecutionSuccess,
            ExecutionStatus::PartialFill => AuditEventType::ExecutionPartialFailure,
            ExecutionStatus::Rejected | ExecutionStatus::Failed => AuditEventType::ExecutionFailed,
        };
        self.log_audit_event(
            event_type,
            details(json!({
                "decision_id": result.decision_id,
                "execution_id": result.execution_id,
                "status": result.status,
                "total_filled_value": result.total_filled_value.to_string(),
                "net_proceeds": result.net_proceeds.to_string(),
                "retry_count": result.retry_count,
                "error": result.error_details.as_ref().map(ToString::to_string),
            })),
        );

        self.finalize(result, started)
    }

    fn reject_invalid(
        &self,
        request: &SwapRequest,
        execution_id: ExecutionId,
        error: ExecutionError,
        started: Instant,
    ) -> ExecutionResult {
        self.log_audit_event(
            AuditEventType::ExecutionRejected,
            details(json!({
                "decision_id": request.decision_id,
                "execution_id": execution_id,
                "error": error.to_string(),
            })),
        );
        tracing::warn!(error = %error, "Swap request rejected");

        let result = ExecutionResult::not_executed(
            request.decision_id.clone(),
            execution_id,
            error,
            started.elapsed(),
            Vec::new(),
        );
        self.finalize(result, started)
    }

    /// Stamp duration, update counters and metrics, attach the audit trail.
    fn finalize(&self, mut result: ExecutionResult, started: Instant) -> ExecutionResult {
        result.execution_duration = started.elapsed();
        result.completed_at = Utc::now();

        self.counters.record_execution(result.status);
        observability::record_swap_execution(
            result.status.as_label(),
            result.execution_duration.as_secs_f64(),
        );
        observability::record_circuit_breaker_state(
            self.circuit_breaker.name(),
            self.circuit_breaker.state().as_gauge(),
        );

        self.log_audit_event(
            AuditEventType::ExecutionComplete,
            details(json!({
                "decision_id": result.decision_id,
                "execution_id": result.execution_id,
                "status": result.status,
                "duration_ms": result.execution_duration.as_millis() as u64,
            })),
        );
        result.audit_trail = self.audit_log.for_execution(result.execution_id.as_str());

        tracing::info!(
            execution_id = %result.execution_id,
            status = %result.status.as_label(),
            retries = result.retry_count,
            duration_ms = result.execution_duration.as_millis() as u64,
            "Swap complete"
        );
        result
    }

    fn classify_response(order: &OrderRequest, response: VenueResponse) -> AttemptOutcome {
        if classifier::is_success(response.retcode) {
            return AttemptOutcome::Accepted(response);
        }

        let comment = if response.comment.is_empty() {
            classifier::describe(response.retcode)
        } else {
            response.comment.as_str()
        };
        match classifier::classify(response.retcode) {
            Some(reason) => {
                let code = if reason == RetryReason::Timeout {
                    ErrorCode::VenueTimeout
                } else {
                    ErrorCode::VenueUnavailable
                };
                AttemptOutcome::Retryable(
                    reason,
                    ExecutionError::new(
                        code,
                        format!("venue returned retcode {}: {comment}", response.retcode),
                    )
                    .with_context("retcode", response.retcode),
                )
            }
            None => AttemptOutcome::Rejected(ExecutionError::order_rejected(
                order.order_id().as_str(),
                response.retcode,
                comment,
            )),
        }
    }

    fn classify_error(err: VenueError) -> AttemptOutcome {
        let error = ExecutionError::new(err.error_code(), err.to_string());
        match err.retry_reason() {
            Some(reason) => AttemptOutcome::Retryable(reason, error),
            None => AttemptOutcome::Failed(error),
        }
    }

    fn accept_fill(
        &self,
        order: &OrderRequest,
        execution_id: &ExecutionId,
        response: &VenueResponse,
        attempt: u32,
        clock: &LegClock,
    ) -> OrderResult {
        let requested = order.quantity();
        let filled = response
            .filled_volume
            .and_then(Decimal::from_f64)
            .unwrap_or(requested)
            .min(requested);

        if filled <= Decimal::ZERO {
            let error = ExecutionError::new(
                ErrorCode::OrderRejected,
                "venue accepted the order but filled nothing",
            )
            .with_context("retcode", response.retcode);
            return self.fail_leg(
                order,
                execution_id,
                ExecutionStatus::Failed,
                error,
                attempt,
                clock,
            );
        }

        let status = if filled < requested {
            ExecutionStatus::PartialFill
        } else {
            ExecutionStatus::Filled
        };
        let quoted_price = response
            .fill_price
            .and_then(Decimal::from_f64)
            .or_else(|| order.price());
        let price_missing = quoted_price.is_none();
        if price_missing {
            tracing::warn!(
                order_id = %order.order_id(),
                retcode = response.retcode,
                "Venue fill carries no price, recording zero"
            );
        }
        let avg_fill_price = quoted_price.unwrap_or(Decimal::ZERO);

        let event_type = if status == ExecutionStatus::Filled {
            AuditEventType::OrderSuccess
        } else {
            AuditEventType::OrderPartialFill
        };
        self.log_audit_event(
            event_type,
            details(json!({
                "execution_id": execution_id,
                "order_id": order.order_id(),
                "side": order.side(),
                "filled_quantity": filled.to_string(),
                "avg_fill_price": avg_fill_price.to_string(),
                "price_missing": price_missing,
                "venue_order_id": response.order_id,
                "attempt": attempt,
            })),
        );
        tracing::info!(
            order_id = %order.order_id(),
            side = %order.side(),
            filled = %filled,
            price = %avg_fill_price,
            "Order filled"
        );

        OrderResult {
            order_id: order.order_id().clone(),
            status,
            filled_quantity: filled,
            avg_fill_price,
            execution_time: clock.started.elapsed(),
            retries_used: attempt,
            error_details: None,
            venue_order_id: response.order_id,
            venue_deal_id: response.deal_id,
            submitted_at: clock.submitted_at,
            completed_at: Utc::now(),
        }
    }

    fn fail_leg(
        &self,
        order: &OrderRequest,
        execution_id: &ExecutionId,
        status: ExecutionStatus,
        error: ExecutionError,
        attempt: u32,
        clock: &LegClock,
    ) -> OrderResult {
        let event_type = if status == ExecutionStatus::Rejected {
            AuditEventType::OrderRejected
        } else {
            AuditEventType::OrderError
        };
        self.log_audit_event(
            event_type,
            details(json!({
                "execution_id": execution_id,
                "order_id": order.order_id(),
                "side": order.side(),
                "attempt": attempt,
                "error_code": error.code(),
                "error": error.to_string(),
            })),
        );
        tracing::error!(
            order_id = %order.order_id(),
            side = %order.side(),
            status = %status.as_label(),
            error = %error,
            "Order failed"
        );

        OrderResult {
            order_id: order.order_id().clone(),
            status,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: Decimal::ZERO,
            execution_time: clock.started.elapsed(),
            retries_used: attempt,
            error_details: Some(error),
            venue_order_id: None,
            venue_deal_id: None,
            submitted_at: clock.submitted_at,
            completed_at: Utc::now(),
        }
    }
}
