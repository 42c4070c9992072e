//! Simulated venue for tests, demos and resilience drills.
//!
//! Outcomes come from a script first; once the script is exhausted they are
//! drawn at random according to the configured fill rates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::ports::{VenueAdapter, VenueError, VenueResponse};
use crate::config::SimulatedVenueConfig;
use crate::domain::order::WireRequest;
use crate::resilience::classifier::retcode;

/// Failure codes drawn when a random call does not fill.
const RANDOM_FAILURES: [u32; 4] = [
    retcode::CONNECTION,
    retcode::TIMEOUT,
    retcode::REJECT,
    retcode::NO_MONEY,
];

/// Stall long enough for any sane order timeout to fire first.
const STALL: Duration = Duration::from_secs(24 * 60 * 60);

/// One scripted venue answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedOutcome {
    /// Fill the whole volume.
    Fill,
    /// Fill this fraction of the volume with `DONE_PARTIAL`.
    PartialFill(f64),
    /// Answer with this result code and no fill.
    Retcode(u32),
    /// Fail at the transport level.
    Error(VenueError),
    /// Never answer.
    Stall,
}

/// In-process venue simulator.
#[derive(Debug)]
pub struct SimulatedVenue {
    config: SimulatedVenueConfig,
    rng: Mutex<StdRng>,
    script: Mutex<VecDeque<SimulatedOutcome>>,
    requests: Mutex<Vec<WireRequest>>,
    next_ticket: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedVenue {
    /// Create a simulator from config.
    #[must_use]
    pub fn new(config: SimulatedVenueConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            config,
            rng: Mutex::new(rng),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// A simulator that fills every order instantly at `base_price`.
    #[must_use]
    pub fn always_fill() -> Self {
        Self::new(SimulatedVenueConfig {
            fill_rate: 1.0,
            partial_fill_rate: 0.0,
            price_jitter: 0.0,
            latency_ms: 0,
            seed: Some(0),
            ..SimulatedVenueConfig::default()
        })
    }

    /// Queue scripted outcomes, consumed one per call.
    #[must_use]
    pub fn with_script(self, outcomes: impl IntoIterator<Item = SimulatedOutcome>) -> Self {
        lock(&self.script).extend(outcomes);
        self
    }

    /// Number of `submit` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<WireRequest> {
        lock(&self.requests).clone()
    }

    fn next_outcome(&self) -> SimulatedOutcome {
        if let Some(outcome) = lock(&self.script).pop_front() {
            return outcome;
        }

        let roll: f64 = lock(&self.rng).random();
        if roll < self.config.fill_rate {
            SimulatedOutcome::Fill
        } else if roll < self.config.fill_rate + self.config.partial_fill_rate {
            SimulatedOutcome::PartialFill(lock(&self.rng).random_range(0.5..0.95))
        } else {
            let index = lock(&self.rng).random_range(0..RANDOM_FAILURES.len());
            SimulatedOutcome::Retcode(RANDOM_FAILURES[index])
        }
    }

    fn fill_price(&self) -> f64 {
        let jitter = self.config.price_jitter;
        if jitter <= 0.0 {
            return self.config.base_price;
        }
        let drift: f64 = lock(&self.rng).random_range(-jitter..=jitter);
        (self.config.base_price * (1.0 + drift) * 100.0).round() / 100.0
    }

    fn fill(&self, code: u32, volume: f64) -> VenueResponse {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        VenueResponse::filled(code, ticket, volume, self.fill_price())
    }
}

#[async_trait]
impl VenueAdapter for SimulatedVenue {
    async fn submit(&self, request: &WireRequest) -> Result<VenueResponse, VenueError> {
        lock(&self.requests).push(request.clone());
        let outcome = self.next_outcome();

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match outcome {
            SimulatedOutcome::Fill => Ok(self.fill(retcode::DONE, request.volume)),
            SimulatedOutcome::PartialFill(ratio) => {
                let filled = (request.volume * ratio.clamp(0.0, 1.0)).floor().max(1.0);
                Ok(self.fill(retcode::DONE_PARTIAL, filled.min(request.volume)))
            }
            SimulatedOutcome::Retcode(code) => Ok(VenueResponse::code(code)),
            SimulatedOutcome::Error(err) => Err(err),
            SimulatedOutcome::Stall => {
                tokio::time::sleep(STALL).await;
                Err(VenueError::Timeout {
                    message: "simulated stall".to_string(),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
