//! # Status Reporting Types
//!
//! Read-only snapshots of circuit breaker state for health endpoints and
//! operational tooling. Snapshots are plain data copied out under the
//! per-breaker lock, so reporting never waits on in-flight operations.

use crate::resilience::CircuitState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Point-in-time snapshot of one circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerStatus {
    /// Dependency this breaker guards
    pub dependency: String,

    /// State at snapshot time
    pub state: CircuitState,

    /// Failures recorded since entering the current state
    pub failure_count: u64,

    /// Successes recorded since entering the current state
    pub success_count: u64,

    /// Timed-out calls over the breaker's lifetime (reporting only)
    pub timeout_count: u64,

    /// Whether a trial call is currently in flight
    pub probe_in_flight: bool,

    /// Seconds spent in the current state
    pub seconds_in_state: u64,

    /// When the current state was entered
    pub entered_state_at: DateTime<Utc>,

    /// When a guarded call last failed or timed out
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl CircuitBreakerStatus {
    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }

    pub fn is_half_open(&self) -> bool {
        self.state == CircuitState::HalfOpen
    }
}

/// Aggregate view over every registered circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatusSummary {
    /// Total number of registered breakers
    pub total_breakers: usize,

    /// Breakers currently failing fast
    pub open_count: usize,

    /// Breakers currently testing recovery
    pub half_open_count: usize,

    /// True when any breaker is open
    pub degraded: bool,

    /// Fraction of breakers in normal operation, 1.0 when none are registered
    pub health_score: f64,

    /// Per-dependency snapshots keyed by dependency name
    pub breakers: HashMap<String, CircuitBreakerStatus>,

    /// When this summary was generated
    pub generated_at: DateTime<Utc>,
}

impl SystemStatusSummary {
    /// Build the aggregate view from per-breaker snapshots
    pub fn from_statuses(breakers: HashMap<String, CircuitBreakerStatus>) -> Self {
        let total_breakers = breakers.len();
        let open_count = breakers.values().filter(|s| s.is_open()).count();
        let half_open_count = breakers.values().filter(|s| s.is_half_open()).count();
        let closed_count = total_breakers - open_count - half_open_count;

        let health_score = if total_breakers == 0 {
            1.0
        } else {
            closed_count as f64 / total_breakers as f64
        };

        Self {
            total_breakers,
            open_count,
            half_open_count,
            degraded: open_count > 0,
            health_score,
            breakers,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(dependency: &str, state: CircuitState) -> CircuitBreakerStatus {
        CircuitBreakerStatus {
            dependency: dependency.to_string(),
            state,
            failure_count: 0,
            success_count: 0,
            timeout_count: 0,
            probe_in_flight: false,
            seconds_in_state: 0,
            entered_state_at: Utc::now(),
            last_failure_at: None,
        }
    }

    #[test]
    fn test_empty_summary_is_healthy() {
        let summary = SystemStatusSummary::from_statuses(HashMap::new());
        assert_eq!(summary.total_breakers, 0);
        assert!(!summary.degraded);
        assert_eq!(summary.health_score, 1.0);
    }

    #[test]
    fn test_summary_counts_and_score() {
        let mut statuses = HashMap::new();
        statuses.insert("dynamodb".to_string(), status("dynamodb", CircuitState::Open));
        statuses.insert("s3".to_string(), status("s3", CircuitState::Closed));
        statuses.insert("kinesis".to_string(), status("kinesis", CircuitState::Closed));
        statuses.insert("sqs".to_string(), status("sqs", CircuitState::HalfOpen));

        let summary = SystemStatusSummary::from_statuses(statuses);
        assert_eq!(summary.total_breakers, 4);
        assert_eq!(summary.open_count, 1);
        assert_eq!(summary.half_open_count, 1);
        assert!(summary.degraded);
        assert_eq!(summary.health_score, 0.5);
    }

    #[test]
    fn test_all_closed_summary_is_not_degraded() {
        let mut statuses = HashMap::new();
        statuses.insert("s3".to_string(), status("s3", CircuitState::Closed));

        let summary = SystemStatusSummary::from_statuses(statuses);
        assert!(!summary.degraded);
        assert_eq!(summary.health_score, 1.0);
    }

    #[test]
    fn test_status_serializes_snake_case_state() {
        let snapshot = status("dynamodb", CircuitState::HalfOpen);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "half_open");
        assert_eq!(json["dependency"], "dynamodb");
    }
}
