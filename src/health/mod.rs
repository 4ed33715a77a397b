//! # Dependency Health Monitoring
//!
//! Health probes for external dependencies, run through the circuit breaker
//! layer so that a dependency which is already failing fast is reported as
//! down without being hammered by further probe traffic.
//!
//! The [`checker::HealthChecker`] aggregates per-dependency reports and the
//! breaker summary into one [`HealthReport`] suitable for a health endpoint.

pub mod checker;

use crate::resilience::SystemStatusSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use checker::{DependencyProbe, HealthChecker};

/// Health classification for a dependency or the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// Dependency is reachable and responding
    Up,
    /// Dependency is unreachable or failing
    Down,
    /// Dependency is partially impaired (e.g. a breaker is open or probing)
    Degraded,
    /// No probe configured, or no result yet
    Unknown,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Up => "up",
            HealthState::Down => "down",
            HealthState::Degraded => "degraded",
            HealthState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by dependency probes
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Health check failed: {message}")]
    CheckFailed { message: String },
}

impl ProbeError {
    /// Create a connection failure error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create a check failure error
    pub fn check_failed(message: impl Into<String>) -> Self {
        Self::CheckFailed {
            message: message.into(),
        }
    }
}

/// Result of probing a single dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Dependency name (matches the circuit breaker name)
    pub name: String,
    /// Probe outcome classification
    pub health: HealthState,
    /// Human-readable detail about the probe result
    pub message: Option<String>,
    /// Whether this dependency's circuit breaker is currently open
    pub circuit_breaker_open: bool,
    /// Probe duration in milliseconds
    pub duration_ms: u64,
    /// When the probe completed
    pub checked_at: DateTime<Utc>,
}

impl DependencyReport {
    /// Build a report for a healthy dependency
    pub fn up(name: impl Into<String>, message: Option<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            health: HealthState::Up,
            message,
            circuit_breaker_open: false,
            duration_ms,
            checked_at: Utc::now(),
        }
    }

    /// Build a report for an unhealthy dependency
    pub fn down(
        name: impl Into<String>,
        message: Option<String>,
        circuit_breaker_open: bool,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            health: HealthState::Down,
            message,
            circuit_breaker_open,
            duration_ms,
            checked_at: Utc::now(),
        }
    }

    /// Build a report for a dependency with no usable probe
    pub fn unknown(name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            health: HealthState::Unknown,
            message,
            circuit_breaker_open: false,
            duration_ms: 0,
            checked_at: Utc::now(),
        }
    }
}

/// Aggregated health of all probed dependencies plus the breaker summary
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Composite status across dependencies and breakers
    pub status: HealthState,
    /// Per-dependency probe results keyed by dependency name
    pub dependencies: HashMap<String, DependencyReport>,
    /// Circuit breaker summary at report time
    pub breakers: SystemStatusSummary,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    /// Assemble a report, deriving the composite status.
    ///
    /// Rollup order: any dependency down wins, then any impairment (open or
    /// probing breakers, degraded dependencies), then up, then unknown.
    pub fn from_parts(
        dependencies: HashMap<String, DependencyReport>,
        breakers: SystemStatusSummary,
    ) -> Self {
        let any_down = dependencies
            .values()
            .any(|d| d.health == HealthState::Down);
        let any_degraded = dependencies
            .values()
            .any(|d| d.health == HealthState::Degraded);
        let any_up = dependencies.values().any(|d| d.health == HealthState::Up);

        let status = if any_down {
            HealthState::Down
        } else if breakers.degraded || breakers.half_open_count > 0 || any_degraded {
            HealthState::Degraded
        } else if any_up {
            HealthState::Up
        } else {
            HealthState::Unknown
        };

        Self {
            status,
            dependencies,
            breakers,
            generated_at: Utc::now(),
        }
    }
}
