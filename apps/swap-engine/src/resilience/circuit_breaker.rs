//! Circuit breaker guarding the execution venue.
//!
//! One breaker is shared by every swap in the process. It counts failed
//! swaps and stops all venue traffic once the count reaches the threshold,
//! then lets traffic probe the venue again after a cool-down.
//!
//! # State Machine
//!
//! ```text
//! CLOSED → OPEN       (failure_count >= failure_threshold)
//! OPEN → HALF_OPEN    (now - last_failure_time > recovery_timeout, on can_execute)
//! HALF_OPEN → CLOSED  (any success; failure_count reset to 0)
//! HALF_OPEN → OPEN    (failure while failure_count >= failure_threshold)
//! ```
//!
//! A success while CLOSED only decrements `failure_count` by one, so a venue
//! failing more often than it succeeds still trips the breaker.
//!
//! # Example
//!
//! ```rust,ignore
//! use swap_engine::resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let breaker = CircuitBreaker::new("venue", CircuitBreakerConfig::default());
//!
//! if breaker.can_execute() {
//!     match run_swap().await {
//!         Ok(_) => breaker.on_success(),
//!         Err(_) => breaker.on_failure(),
//!     }
//! } else {
//!     // Circuit is open, fail fast
//! }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitBreakerState {
    /// Circuit is closed, calls flow normally.
    Closed,
    /// Circuit is open, calls are rejected.
    Open,
    /// Recovery timeout elapsed, calls probe the venue.
    HalfOpen,
}

impl CircuitBreakerState {
    /// Numeric encoding for the state gauge (0 closed, 1 open, 2 half-open).
    #[must_use]
    pub const fn as_gauge(&self) -> f64 {
        match self {
            Self::Closed => 0.0,
            Self::Open => 1.0,
            Self::HalfOpen => 2.0,
        }
    }
}

impl std::fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failures that open the circuit.
    pub failure_threshold: u32,
    /// Time to stay OPEN after the last failure.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitBreakerState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    trips: u64,
}

/// Circuit breaker for the execution venue.
///
/// All transitions happen under one lock, so concurrent swaps observe a
/// consistent `(state, failure_count)` pair.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Service name for logging.
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker in the CLOSED state.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitBreakerState::Closed,
                failure_count: 0,
                last_failure_time: None,
                trips: 0,
            }),
        }
    }

    /// Get the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the current state without triggering the recovery transition.
    #[must_use]
    pub fn state(&self) -> CircuitBreakerState {
        self.lock().state
    }

    /// Current failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Check if a swap may contact the venue.
    ///
    /// While OPEN, the first call after the recovery timeout moves the
    /// breaker to HALF_OPEN and is allowed through.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitBreakerState::Closed | CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => {
                let recovered = inner
                    .last_failure_time
                    .is_none_or(|at| at.elapsed() > self.config.recovery_timeout);
                if recovered {
                    inner.state = CircuitBreakerState::HalfOpen;
                    drop(inner);
                    tracing::info!(
                        name = %self.name,
                        from = "OPEN",
                        to = "HALF_OPEN",
                        "Circuit breaker testing"
                    );
                }
                recovered
            }
        }
    }

    /// Record a failed swap.
    pub fn on_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure_time = Some(Instant::now());

        if inner.failure_count >= self.config.failure_threshold
            && inner.state != CircuitBreakerState::Open
        {
            let previous = inner.state;
            inner.state = CircuitBreakerState::Open;
            inner.trips += 1;
            let failure_count = inner.failure_count;
            drop(inner);

            tracing::warn!(
                name = %self.name,
                from = %previous,
                to = "OPEN",
                failure_count,
                "Circuit breaker opened"
            );
        }
    }

    /// Record a successful swap.
    pub fn on_success(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitBreakerState::HalfOpen {
            inner.state = CircuitBreakerState::Closed;
            inner.failure_count = 0;
            drop(inner);

            tracing::info!(
                name = %self.name,
                from = "HALF_OPEN",
                to = "CLOSED",
                "Circuit breaker closed"
            );
        } else {
            inner.failure_count = inner.failure_count.saturating_sub(1);
        }
    }

    /// Force the circuit breaker to open (for testing or emergency).
    pub fn force_open(&self) {
        let mut inner = self.lock();
        let previous = inner.state;
        inner.last_failure_time = Some(Instant::now());
        if previous != CircuitBreakerState::Open {
            inner.state = CircuitBreakerState::Open;
            inner.trips += 1;
            drop(inner);

            tracing::warn!(
                name = %self.name,
                from = %previous,
                to = "OPEN",
                "Circuit breaker forced open"
            );
        }
    }

    /// Force the circuit breaker to close (for testing or recovery).
    pub fn force_close(&self) {
        let mut inner = self.lock();
        let previous = inner.state;
        inner.state = CircuitBreakerState::Closed;
        inner.failure_count = 0;
        inner.last_failure_time = None;
        drop(inner);

        if previous != CircuitBreakerState::Closed {
            tracing::info!(
                name = %self.name,
                from = %previous,
                to = "CLOSED",
                "Circuit breaker forced closed"
            );
        }
    }

    /// Get metrics for this circuit breaker.
    #[must_use]
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.lock();
        CircuitBreakerMetrics {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            trips: inner.trips,
        }
    }
}

/// Metrics for a circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Service name.
    pub name: String,
    /// Current state.
    pub state: CircuitBreakerState,
    /// Current failure count.
    pub failure_count: u32,
    /// Times the circuit has opened.
    pub trips: u64,
}
