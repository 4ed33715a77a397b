//! # Circuit Breaker Implementation
//!
//! Provides fault isolation to prevent cascade failures when a named external
//! dependency degrades. This implementation follows the classic circuit
//! breaker pattern with three states: Closed (normal operation), Open
//! (failing fast), and HalfOpen (testing recovery with a single trial call).
//!
//! All bookkeeping for one dependency lives behind a single short-hold mutex
//! so that the routing decision for a call (state check plus trial-slot
//! reservation) is one atomic step. The guarded operation itself always runs
//! outside the lock, bounded by the configured call timeout.

use crate::resilience::{CallOutcome, CircuitBreakerConfig, CircuitBreakerStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls flow through to the dependency
    Closed,
    /// Failure mode, calls are refused and take the fallback
    Open,
    /// Testing recovery, a single trial call is allowed through
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during circuit breaker operation
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open or the trial slot is taken, call was refused
    #[error("Circuit breaker is open for {dependency}")]
    CircuitOpen { dependency: String },

    /// Operation ran to completion and failed
    #[error("Operation failed: {0}")]
    OperationFailed(E),

    /// Operation did not complete within the call timeout
    #[error("Operation timed out after {timeout:?} for {dependency}")]
    OperationTimedOut {
        dependency: String,
        timeout: Duration,
    },
}

/// Mutable per-dependency record guarded by the breaker mutex.
///
/// `failure_count` and `success_count` reset on every state transition; the
/// failure window is therefore "consecutive failures since this state was
/// entered". `timeout_count` is a monotonic reporting tally and survives
/// transitions. `epoch` increments on every transition so commits from calls
/// routed in an earlier window can be recognized and dropped.
#[derive(Debug)]
struct DependencyState {
    state: CircuitState,
    failure_count: u64,
    success_count: u64,
    timeout_count: u64,
    probe_in_flight: bool,
    epoch: u64,
    entered_state_at: Instant,
    entered_state_wall: DateTime<Utc>,
    last_failure_at: Option<DateTime<Utc>>,
}

impl DependencyState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            timeout_count: 0,
            probe_in_flight: false,
            epoch: 0,
            entered_state_at: Instant::now(),
            entered_state_wall: Utc::now(),
            last_failure_at: None,
        }
    }

    fn transition(&mut self, next: CircuitState) {
        self.state = next;
        self.failure_count = 0;
        self.success_count = 0;
        self.probe_in_flight = false;
        self.epoch += 1;
        self.entered_state_at = Instant::now();
        self.entered_state_wall = Utc::now();
    }
}

/// Admission ticket for one call, issued by the routing decision
#[derive(Debug, Clone, Copy)]
struct CallTicket {
    epoch: u64,
    probe: bool,
}

/// Routing decision for one call, taken in a single critical section
#[derive(Debug, Clone, Copy)]
enum CallRoute {
    Proceed(CallTicket),
    Refused,
}

/// How a guarded operation finished, with its payload
enum Completion<T, E> {
    Success(T),
    Failure(E),
    TimedOut,
}

/// Core circuit breaker guarding calls into one named dependency
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Dependency name for logging and status reporting
    name: String,

    /// Configuration parameters, fixed at construction
    config: CircuitBreakerConfig,

    /// Per-dependency state record
    inner: Mutex<DependencyState>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given dependency name and configuration
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!(
            dependency = %name,
            failure_threshold = config.failure_threshold,
            open_cooldown_seconds = config.open_cooldown.as_secs(),
            call_timeout_seconds = config.call_timeout.as_secs(),
            "🛡️ Circuit breaker initialized"
        );

        Self {
            name,
            config,
            inner: Mutex::new(DependencyState::new()),
        }
    }

    /// Get the dependency name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configuration this breaker was constructed with
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current circuit state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Whether the circuit is in normal operation
    pub fn is_healthy(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    /// Execute an operation with a fallback.
    ///
    /// Returns the operation's result when it completes successfully. The
    /// fallback result is returned whenever the operation is not invoked
    /// (circuit open or trial slot taken) or fails or times out. An error
    /// from the fallback itself propagates to the caller unmodified.
    /// Refused calls never count against the failure threshold.
    pub async fn execute<F, Fut, FB, FbFut, T, E>(&self, operation: F, fallback: FB) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce() -> FbFut,
        FbFut: Future<Output = Result<T, E>>,
    {
        match self.route_call() {
            CallRoute::Refused => fallback().await,
            CallRoute::Proceed(ticket) => match self.run_guarded(ticket, operation).await {
                Completion::Success(value) => Ok(value),
                Completion::Failure(_) | Completion::TimedOut => fallback().await,
            },
        }
    }

    /// Execute an operation, surfacing refusals and timeouts as errors.
    ///
    /// Call sites that have no fallback use this form and match on the
    /// error to distinguish a refusal from a dependency failure.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.route_call() {
            CallRoute::Refused => Err(CircuitBreakerError::CircuitOpen {
                dependency: self.name.clone(),
            }),
            CallRoute::Proceed(ticket) => match self.run_guarded(ticket, operation).await {
                Completion::Success(value) => Ok(value),
                Completion::Failure(error) => Err(CircuitBreakerError::OperationFailed(error)),
                Completion::TimedOut => Err(CircuitBreakerError::OperationTimedOut {
                    dependency: self.name.clone(),
                    timeout: self.config.call_timeout,
                }),
            },
        }
    }

    /// Force circuit to open state (for emergency situations)
    pub fn force_open(&self) {
        warn!(dependency = %self.name, "🚨 Circuit breaker forced open");
        self.inner.lock().transition(CircuitState::Open);
    }

    /// Force circuit to closed state (for emergency recovery)
    pub fn force_closed(&self) {
        warn!(dependency = %self.name, "🚨 Circuit breaker forced closed");
        self.inner.lock().transition(CircuitState::Closed);
    }

    /// Point-in-time snapshot of this breaker's state and counters.
    ///
    /// Takes the record lock only long enough to copy; an in-flight
    /// operation never holds that lock, so status reads are never blocked
    /// by a slow dependency.
    pub fn status(&self) -> CircuitBreakerStatus {
        let inner = self.inner.lock();
        CircuitBreakerStatus {
            dependency: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            timeout_count: inner.timeout_count,
            probe_in_flight: inner.probe_in_flight,
            seconds_in_state: inner.entered_state_at.elapsed().as_secs(),
            entered_state_at: inner.entered_state_wall,
            last_failure_at: inner.last_failure_at,
        }
    }

    /// Decide whether a call may proceed, reserving the trial slot when the
    /// decision is a half-open probe. One critical section, so exactly one
    /// caller wins the trial when the cooldown expires under concurrency.
    fn route_call(&self) -> CallRoute {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => CallRoute::Proceed(CallTicket {
                epoch: inner.epoch,
                probe: false,
            }),
            CircuitState::Open => {
                if inner.entered_state_at.elapsed() >= self.config.open_cooldown {
                    inner.transition(CircuitState::HalfOpen);
                    inner.probe_in_flight = true;
                    info!(
                        dependency = %self.name,
                        "🟡 Circuit breaker half-open (testing recovery)"
                    );
                    CallRoute::Proceed(CallTicket {
                        epoch: inner.epoch,
                        probe: true,
                    })
                } else {
                    debug!(
                        dependency = %self.name,
                        seconds_in_state = inner.entered_state_at.elapsed().as_secs(),
                        "⛔ Circuit open, call refused"
                    );
                    CallRoute::Refused
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    debug!(
                        dependency = %self.name,
                        "⛔ Trial call already in flight, call refused"
                    );
                    CallRoute::Refused
                } else {
                    inner.probe_in_flight = true;
                    CallRoute::Proceed(CallTicket {
                        epoch: inner.epoch,
                        probe: true,
                    })
                }
            }
        }
    }

    /// Run an admitted operation under the call timeout and commit the
    /// classified outcome. The guard commits a failure if this future is
    /// dropped before the operation resolves, so cancelled calls still
    /// count and a reserved trial slot is always released.
    async fn run_guarded<F, Fut, T, E>(&self, ticket: CallTicket, operation: F) -> Completion<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut guard = InFlightGuard::new(self, ticket);
        let timed = tokio::time::timeout(self.config.call_timeout, operation()).await;
        let outcome = CallOutcome::from_timed(&timed);
        guard.commit(outcome);

        match timed {
            Ok(Ok(value)) => Completion::Success(value),
            Ok(Err(error)) => Completion::Failure(error),
            Err(_) => Completion::TimedOut,
        }
    }

    /// Apply a classified outcome to the state machine.
    ///
    /// Commits carrying a stale epoch are from calls routed before the most
    /// recent transition; they only update the monotonic tallies and never
    /// touch the fresh counting window.
    fn commit_outcome(&self, ticket: CallTicket, outcome: CallOutcome, elapsed: Duration) {
        let mut inner = self.inner.lock();

        if outcome == CallOutcome::Timeout {
            inner.timeout_count += 1;
        }
        if outcome.counts_as_failure() {
            inner.last_failure_at = Some(Utc::now());
        }

        if inner.epoch != ticket.epoch {
            debug!(
                dependency = %self.name,
                outcome = %outcome,
                state = %inner.state,
                "Outcome from a previous window ignored after state transition"
            );
            return;
        }

        if ticket.probe {
            inner.probe_in_flight = false;
            if outcome.counts_as_failure() {
                inner.transition(CircuitState::Open);
                error!(
                    dependency = %self.name,
                    outcome = %outcome,
                    open_cooldown_seconds = self.config.open_cooldown.as_secs(),
                    "🔴 Trial call failed, circuit breaker re-opened"
                );
            } else {
                inner.transition(CircuitState::Closed);
                info!(
                    dependency = %self.name,
                    duration_ms = elapsed.as_millis() as u64,
                    "🟢 Trial call succeeded, circuit breaker closed (recovered)"
                );
            }
            return;
        }

        // Ticket epoch matches and this is not a probe, so the circuit is
        // still in the closed window the call was admitted in.
        match outcome {
            CallOutcome::Success => {
                inner.success_count += 1;
                debug!(
                    dependency = %self.name,
                    duration_ms = elapsed.as_millis() as u64,
                    "🟢 Operation succeeded"
                );
            }
            CallOutcome::Failure | CallOutcome::Timeout => {
                inner.failure_count += 1;
                error!(
                    dependency = %self.name,
                    outcome = %outcome,
                    duration_ms = elapsed.as_millis() as u64,
                    failure_count = inner.failure_count,
                    failure_threshold = self.config.failure_threshold,
                    "🔴 Operation failed"
                );

                if inner.failure_count >= u64::from(self.config.failure_threshold) {
                    inner.transition(CircuitState::Open);
                    error!(
                        dependency = %self.name,
                        failure_threshold = self.config.failure_threshold,
                        open_cooldown_seconds = self.config.open_cooldown.as_secs(),
                        "🔴 Circuit breaker opened (failing fast)"
                    );
                }
            }
        }
    }
}

/// Commits the outcome of one admitted call exactly once.
///
/// Dropping the guard uncommitted (the caller cancelled the call) commits a
/// failure for the window the call was admitted in.
struct InFlightGuard<'a> {
    breaker: &'a CircuitBreaker,
    ticket: CallTicket,
    started: Instant,
    committed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(breaker: &'a CircuitBreaker, ticket: CallTicket) -> Self {
        Self {
            breaker,
            ticket,
            started: Instant::now(),
            committed: false,
        }
    }

    fn commit(&mut self, outcome: CallOutcome) {
        self.committed = true;
        self.breaker
            .commit_outcome(self.ticket, outcome, self.started.elapsed());
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(
                dependency = %self.breaker.name,
                "Call dropped mid-flight, committing as failure"
            );
            self.breaker
                .commit_outcome(self.ticket, CallOutcome::Failure, self.started.elapsed());
        }
    }
}
