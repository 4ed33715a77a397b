//! # Resilience Configuration System
//!
//! YAML-backed configuration for circuit breakers and logging. Configuration is
//! explicit and validated at load time; there are no silent fallbacks that paper
//! over a malformed file.
//!
//! ## Architecture
//!
//! - **Single Source of Truth**: All configuration comes from YAML files
//! - **Environment Awareness**: Supports development/test/production overrides
//! - **Explicit Validation**: Bad values fail the load instead of being clamped
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resilience_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let config = ConfigManager::load()?;
//!
//! // Access configuration values
//! let threshold = config.config().circuit_breakers.default.failure_threshold;
//! let dynamo = config.config().circuit_breakers.config_for("dynamodb");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring resilience-config.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResilienceConfig {
    /// Circuit breaker thresholds and per-dependency overrides
    #[serde(default)]
    pub circuit_breakers: CircuitBreakerSettings,

    /// Structured logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ResilienceConfig {
    /// Validate the loaded configuration, returning the first problem found.
    ///
    /// Thresholds and durations must be at least 1 so a typo'd zero cannot
    /// produce a breaker that opens instantly or never times out.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_breaker_block("circuit_breakers.default", &self.circuit_breakers.default)?;

        for (name, dependency) in &self.circuit_breakers.dependencies {
            if name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "circuit_breakers.dependencies",
                    "dependency names must be non-empty",
                ));
            }
            let prefix = format!("circuit_breakers.dependencies.{name}");
            validate_breaker_block(&prefix, dependency)?;
        }

        if let Some(level) = &self.logging.level {
            let known = ["trace", "debug", "info", "warn", "error"];
            if !known.contains(&level.to_lowercase().as_str()) {
                return Err(ConfigurationError::invalid_value(
                    "logging.level",
                    level.clone(),
                    "expected one of trace, debug, info, warn, error",
                ));
            }
        }

        Ok(())
    }
}

fn validate_breaker_block(
    prefix: &str,
    block: &DependencyBreakerConfig,
) -> ConfigResult<()> {
    if block.failure_threshold < 1 {
        return Err(ConfigurationError::invalid_value(
            format!("{prefix}.failure_threshold"),
            block.failure_threshold.to_string(),
            "failure threshold must be at least 1",
        ));
    }
    if block.open_cooldown_seconds < 1 {
        return Err(ConfigurationError::invalid_value(
            format!("{prefix}.open_cooldown_seconds"),
            block.open_cooldown_seconds.to_string(),
            "cooldown must be at least 1 second",
        ));
    }
    if block.call_timeout_seconds < 1 {
        return Err(ConfigurationError::invalid_value(
            format!("{prefix}.call_timeout_seconds"),
            block.call_timeout_seconds.to_string(),
            "call timeout must be at least 1 second",
        ));
    }
    Ok(())
}

/// Circuit breaker section of the configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CircuitBreakerSettings {
    /// Master switch; disabled breakers admit every call unconditionally
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Thresholds applied to dependencies without an explicit override
    #[serde(default)]
    pub default: DependencyBreakerConfig,

    /// Per-dependency threshold overrides keyed by dependency name
    #[serde(default)]
    pub dependencies: HashMap<String, DependencyBreakerConfig>,
}

fn default_enabled() -> bool {
    true
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default: DependencyBreakerConfig::default(),
            dependencies: HashMap::new(),
        }
    }
}

impl CircuitBreakerSettings {
    /// Resolve the breaker block for a dependency, falling back to the default
    pub fn config_for(&self, dependency: &str) -> &DependencyBreakerConfig {
        self.dependencies.get(dependency).unwrap_or(&self.default)
    }
}

/// Thresholds for a single dependency's circuit breaker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependencyBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before admitting a trial call
    pub open_cooldown_seconds: u64,

    /// Seconds a guarded call may run before it counts as a timeout failure
    pub call_timeout_seconds: u64,
}

impl Default for DependencyBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_cooldown_seconds: 60,
            call_timeout_seconds: 5,
        }
    }
}

impl DependencyBreakerConfig {
    /// Convert the YAML block into the runtime configuration the breaker uses
    pub fn to_breaker_config(&self) -> crate::resilience::CircuitBreakerConfig {
        crate::resilience::CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            open_cooldown: Duration::from_secs(self.open_cooldown_seconds),
            call_timeout: Duration::from_secs(self.call_timeout_seconds),
        }
    }
}

/// Logging section of the configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level filter (trace/debug/info/warn/error); environment default when unset
    #[serde(default)]
    pub level: Option<String>,

    /// Directory for JSON log files; defaults to `log/`
    #[serde(default)]
    pub directory: Option<String>,
}
