//! Dependency Health Checker
//!
//! Runs registered probes through the circuit breaker manager. A dependency
//! whose breaker is open is reported as down from the refusal path without the
//! probe being invoked, so health sweeps never add load to a failing system.

use super::{DependencyReport, HealthReport, HealthState, ProbeError};
use crate::logging;
use crate::resilience::CircuitBreakerManager;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A health probe for one external dependency.
///
/// `probe` should perform the cheapest request that proves the dependency is
/// reachable (a DynamoDB `DescribeTable`, a Kinesis `ListShards`, a ping).
/// The success value is a human-readable detail for the health report.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Dependency name; doubles as the circuit breaker name
    fn name(&self) -> &str;

    /// Whether the underlying client is configured; unconfigured probes are
    /// reported as unknown and never create a circuit breaker
    fn is_configured(&self) -> bool {
        true
    }

    /// Run the probe against the live dependency
    async fn probe(&self) -> Result<String, ProbeError>;
}

/// Aggregates dependency probes into system health reports
pub struct HealthChecker {
    manager: Arc<CircuitBreakerManager>,
    probes: Vec<Arc<dyn DependencyProbe>>,
}

impl HealthChecker {
    pub fn new(manager: Arc<CircuitBreakerManager>) -> Self {
        Self {
            manager,
            probes: Vec::new(),
        }
    }

    /// Register a probe; its name keys the per-dependency report
    pub fn register(&mut self, probe: Arc<dyn DependencyProbe>) {
        self.probes.push(probe);
    }

    /// The circuit breaker manager this checker reports through
    pub fn manager(&self) -> &Arc<CircuitBreakerManager> {
        &self.manager
    }

    /// Probe every registered dependency and assemble the composite report
    pub async fn check_all(&self) -> HealthReport {
        let checks = self.probes.iter().map(|probe| self.check_probe(probe));
        let reports = join_all(checks).await;

        let mut dependencies = HashMap::with_capacity(reports.len());
        for report in reports {
            dependencies.insert(report.name.clone(), report);
        }

        let breakers = self.manager.circuit_summary().await;
        let report = HealthReport::from_parts(dependencies, breakers);

        match report.status {
            HealthState::Down => warn!(
                status = %report.status,
                dependencies = report.dependencies.len(),
                open_breakers = report.breakers.open_count,
                "🚨 Health check sweep found dependencies down"
            ),
            _ => info!(
                status = %report.status,
                dependencies = report.dependencies.len(),
                open_breakers = report.breakers.open_count,
                "✅ Health check sweep complete"
            ),
        }

        report
    }

    /// Probe a single dependency by name; `None` if no such probe is registered
    pub async fn check_dependency(&self, dependency: &str) -> Option<DependencyReport> {
        let probe = self.probes.iter().find(|p| p.name() == dependency)?;
        Some(self.check_probe(probe).await)
    }

    async fn check_probe(&self, probe: &Arc<dyn DependencyProbe>) -> DependencyReport {
        let name = probe.name().to_string();

        if !probe.is_configured() {
            debug!(dependency = %name, "Skipping health probe, client not configured");
            return DependencyReport::unknown(name, Some("client not configured".to_string()));
        }

        let started = Instant::now();

        // The fallback runs after the failure is committed, so it cannot see
        // the probe error through the return path; this slot carries it over.
        let failure_detail: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let op_name = name.clone();
        let op_probe = Arc::clone(probe);
        let op_detail = Arc::clone(&failure_detail);
        let operation = move || async move {
            match op_probe.probe().await {
                Ok(message) => Ok(DependencyReport::up(op_name, Some(message), 0)),
                Err(e) => {
                    warn!(dependency = %op_name, error = %e, "Dependency probe failed");
                    *op_detail.lock() = Some(e.to_string());
                    Err(e)
                }
            }
        };

        let fb_name = name.clone();
        let fb_manager = Arc::clone(&self.manager);
        let fb_detail = Arc::clone(&failure_detail);
        let fallback = move || async move {
            let breaker_open = fb_manager
                .dependency_status(&fb_name)
                .await
                .is_some_and(|status| status.is_open());
            let message = match fb_detail.lock().take() {
                Some(detail) => detail,
                None if breaker_open => {
                    "circuit breaker open, dependency calls suspended".to_string()
                }
                None => "dependency check failed".to_string(),
            };
            Ok::<_, ProbeError>(DependencyReport::down(
                fb_name,
                Some(message),
                breaker_open,
                0,
            ))
        };

        let report = match self.manager.execute(&name, operation, fallback).await {
            Ok(mut report) => {
                report.duration_ms = started.elapsed().as_millis() as u64;
                report
            }
            Err(error) => DependencyReport::down(
                name.clone(),
                Some(error.to_string()),
                false,
                started.elapsed().as_millis() as u64,
            ),
        };

        logging::log_dependency_check(
            &name,
            report.health.as_str(),
            report.duration_ms,
            report.message.as_deref(),
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;

    struct StaticProbe {
        name: &'static str,
        configured: bool,
        healthy: bool,
    }

    #[async_trait]
    impl DependencyProbe for StaticProbe {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn probe(&self) -> Result<String, ProbeError> {
            if self.healthy {
                Ok("reachable".to_string())
            } else {
                Err(ProbeError::connection_failed("connection refused"))
            }
        }
    }

    fn manager() -> Arc<CircuitBreakerManager> {
        Arc::new(CircuitBreakerManager::new(CircuitBreakerConfig::default()))
    }

    #[tokio::test]
    async fn test_healthy_probe_reports_up() {
        let mut checker = HealthChecker::new(manager());
        checker.register(Arc::new(StaticProbe {
            name: "dynamodb",
            configured: true,
            healthy: true,
        }));

        let report = checker.check_all().await;
        assert_eq!(report.status, HealthState::Up);
        let dep = &report.dependencies["dynamodb"];
        assert_eq!(dep.health, HealthState::Up);
        assert_eq!(dep.message.as_deref(), Some("reachable"));
        assert!(!dep.circuit_breaker_open);
    }

    #[tokio::test]
    async fn test_unconfigured_probe_reports_unknown_without_breaker() {
        let mgr = manager();
        let mut checker = HealthChecker::new(Arc::clone(&mgr));
        checker.register(Arc::new(StaticProbe {
            name: "sqs",
            configured: false,
            healthy: true,
        }));

        let report = checker.check_all().await;
        assert_eq!(report.dependencies["sqs"].health, HealthState::Unknown);
        // A probe that never runs must not materialize a breaker
        assert!(mgr.list_dependencies().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_probe_reports_down_with_detail() {
        let mut checker = HealthChecker::new(manager());
        checker.register(Arc::new(StaticProbe {
            name: "kinesis",
            configured: true,
            healthy: false,
        }));

        let report = checker.check_dependency("kinesis").await.unwrap();
        assert_eq!(report.health, HealthState::Down);
        assert_eq!(
            report.message.as_deref(),
            Some("Connection failed: connection refused")
        );
        assert!(!report.circuit_breaker_open);
    }

    #[tokio::test]
    async fn test_unregistered_dependency_returns_none() {
        let checker = HealthChecker::new(manager());
        assert!(checker.check_dependency("redis").await.is_none());
    }
}
