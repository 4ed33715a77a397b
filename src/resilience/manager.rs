//! # Circuit Breaker Manager
//!
//! Registry of named circuit breakers with lazy creation. The manager is an
//! explicit object constructed once at startup and shared via `Arc`; there is
//! no global registry. Each dependency gets exactly one breaker, created on
//! first use with its configured thresholds.

use crate::config::ResilienceConfig;
use crate::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStatus, SystemStatusSummary,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Concurrency-safe registry mapping dependency names to circuit breakers
#[derive(Debug)]
pub struct CircuitBreakerManager {
    /// Master switch from configuration. When false, [`Self::execute`] runs
    /// every operation unguarded and no breakers are created.
    enabled: bool,

    /// Thresholds applied to dependencies without an explicit override
    default_config: CircuitBreakerConfig,

    /// Per-dependency threshold overrides, fixed at construction
    dependency_configs: HashMap<String, CircuitBreakerConfig>,

    /// Registered breakers, created lazily
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerManager {
    /// Create a manager applying the same configuration to every dependency
    pub fn new(default_config: CircuitBreakerConfig) -> Self {
        Self::with_dependency_configs(default_config, HashMap::new())
    }

    /// Create a manager with per-dependency threshold overrides
    pub fn with_dependency_configs(
        default_config: CircuitBreakerConfig,
        dependency_configs: HashMap<String, CircuitBreakerConfig>,
    ) -> Self {
        Self {
            enabled: true,
            default_config,
            dependency_configs,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Build a manager from the loaded YAML configuration.
    ///
    /// Honors the `circuit_breakers.enabled` master switch: a disabled
    /// manager admits every call unguarded instead of routing through
    /// breakers.
    pub fn from_config(config: &ResilienceConfig) -> Self {
        let default_config = config.circuit_breakers.default.to_breaker_config();
        let dependency_configs: HashMap<String, CircuitBreakerConfig> = config
            .circuit_breakers
            .dependencies
            .iter()
            .map(|(name, settings)| (name.clone(), settings.to_breaker_config()))
            .collect();

        if config.circuit_breakers.enabled {
            info!(
                failure_threshold = default_config.failure_threshold,
                open_cooldown_seconds = default_config.open_cooldown.as_secs(),
                dependency_overrides = dependency_configs.len(),
                "🛡️ Circuit breaker manager initialized from configuration"
            );
        } else {
            info!("📤 Circuit breakers disabled in configuration, calls run unguarded");
        }

        Self {
            enabled: config.circuit_breakers.enabled,
            default_config,
            dependency_configs,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Whether calls are routed through circuit breakers
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the configuration a breaker for `dependency` would be built with
    pub fn config_for(&self, dependency: &str) -> CircuitBreakerConfig {
        self.dependency_configs
            .get(dependency)
            .cloned()
            .unwrap_or_else(|| self.default_config.clone())
    }

    /// Get the breaker for a dependency, creating it on first use.
    ///
    /// Safe under concurrent first access: the first writer wins and every
    /// competitor converges on the same instance.
    pub async fn get_or_create(&self, dependency: &str) -> Arc<CircuitBreaker> {
        {
            let breakers = self.breakers.read().await;
            if let Some(breaker) = breakers.get(dependency) {
                return Arc::clone(breaker);
            }
        }

        let mut breakers = self.breakers.write().await;
        Arc::clone(breakers.entry(dependency.to_string()).or_insert_with(|| {
            debug!(dependency = %dependency, "Creating circuit breaker on first use");
            Arc::new(CircuitBreaker::new(dependency, self.config_for(dependency)))
        }))
    }

    /// Execute an operation against a named dependency with a fallback.
    ///
    /// See [`CircuitBreaker::execute`] for the routing contract. When
    /// breakers are disabled by configuration the operation always runs,
    /// without a timeout bound or failure counting; a failing operation
    /// still takes the fallback.
    pub async fn execute<F, Fut, FB, FbFut, T, E>(
        &self,
        dependency: &str,
        operation: F,
        fallback: FB,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce() -> FbFut,
        FbFut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return match operation().await {
                Ok(value) => Ok(value),
                Err(_) => fallback().await,
            };
        }

        let breaker = self.get_or_create(dependency).await;
        breaker.execute(operation, fallback).await
    }

    /// Snapshot every registered breaker, keyed by dependency name
    pub async fn snapshot_all(&self) -> HashMap<String, CircuitBreakerStatus> {
        let breakers = self.breakers.read().await;
        breakers
            .iter()
            .map(|(name, breaker)| (name.clone(), breaker.status()))
            .collect()
    }

    /// Snapshot one dependency's breaker, `None` when it was never guarded
    pub async fn dependency_status(&self, dependency: &str) -> Option<CircuitBreakerStatus> {
        let breakers = self.breakers.read().await;
        breakers.get(dependency).map(|breaker| breaker.status())
    }

    /// Names of all registered dependencies, sorted
    pub async fn list_dependencies(&self) -> Vec<String> {
        let breakers = self.breakers.read().await;
        let mut names: Vec<String> = breakers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Force a dependency's breaker back to closed. Returns false when the
    /// dependency has no breaker.
    pub async fn reset(&self, dependency: &str) -> bool {
        let breakers = self.breakers.read().await;
        match breakers.get(dependency) {
            Some(breaker) => {
                breaker.force_closed();
                true
            }
            None => false,
        }
    }

    /// Force a dependency's breaker open. Returns false when the dependency
    /// has no breaker.
    pub async fn force_open(&self, dependency: &str) -> bool {
        let breakers = self.breakers.read().await;
        match breakers.get(dependency) {
            Some(breaker) => {
                breaker.force_open();
                true
            }
            None => false,
        }
    }

    /// Fraction of registered breakers in normal operation, 1.0 when empty
    pub async fn system_health_score(&self) -> f64 {
        let breakers = self.breakers.read().await;
        if breakers.is_empty() {
            return 1.0;
        }
        let healthy = breakers.values().filter(|b| b.is_healthy()).count();
        healthy as f64 / breakers.len() as f64
    }

    /// Aggregate summary over every registered breaker
    pub async fn circuit_summary(&self) -> SystemStatusSummary {
        SystemStatusSummary::from_statuses(self.snapshot_all().await)
    }
}

impl Default for CircuitBreakerManager {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
