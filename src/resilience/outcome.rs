//! # Call Outcome Classification
//!
//! Pure, stateless classification of a completed dependency call. The state
//! machine only distinguishes "counts against the failure threshold" from
//! "does not"; timeouts keep their own label so status reporting can tell
//! slow dependencies apart from failing ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::error::Elapsed;

/// Classification of a single guarded call against a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Operation completed and returned `Ok`
    Success,
    /// Operation completed and returned `Err`
    Failure,
    /// Operation did not complete within the configured call timeout
    Timeout,
}

impl CallOutcome {
    /// Classify the result of an operation that ran to completion
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => CallOutcome::Success,
            Err(_) => CallOutcome::Failure,
        }
    }

    /// Classify the result of an operation that ran under `tokio::time::timeout`
    pub fn from_timed<T, E>(result: &Result<Result<T, E>, Elapsed>) -> Self {
        match result {
            Ok(inner) => Self::from_result(inner),
            Err(_) => CallOutcome::Timeout,
        }
    }

    /// Whether this outcome counts against the consecutive-failure threshold.
    /// Timeouts fold into failures here; the distinction is reporting-only.
    pub fn counts_as_failure(&self) -> bool {
        matches!(self, CallOutcome::Failure | CallOutcome::Timeout)
    }

    /// Whether this outcome represents a successful call
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Timeout => "timeout",
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[test]
    fn test_classification_from_completed_results() {
        let ok: Result<&str, String> = Ok("fine");
        let err: Result<&str, String> = Err("boom".to_string());

        assert_eq!(CallOutcome::from_result(&ok), CallOutcome::Success);
        assert_eq!(CallOutcome::from_result(&err), CallOutcome::Failure);
    }

    #[tokio::test]
    async fn test_classification_from_timed_results() {
        let completed = timeout(Duration::from_millis(50), async {
            Ok::<_, String>("fast")
        })
        .await;
        assert_eq!(CallOutcome::from_timed(&completed), CallOutcome::Success);

        let failed = timeout(Duration::from_millis(50), async {
            Err::<&str, _>("boom".to_string())
        })
        .await;
        assert_eq!(CallOutcome::from_timed(&failed), CallOutcome::Failure);

        let elapsed: Result<Result<&str, String>, _> =
            timeout(Duration::from_millis(5), async {
                sleep(Duration::from_millis(100)).await;
                Ok("too late")
            })
            .await;
        assert_eq!(CallOutcome::from_timed(&elapsed), CallOutcome::Timeout);
    }

    #[test]
    fn test_timeout_counts_as_failure() {
        assert!(!CallOutcome::Success.counts_as_failure());
        assert!(CallOutcome::Failure.counts_as_failure());
        assert!(CallOutcome::Timeout.counts_as_failure());

        assert!(CallOutcome::Success.is_success());
        assert!(!CallOutcome::Timeout.is_success());
    }

    #[test]
    fn test_display_and_serialization_use_snake_case() {
        assert_eq!(CallOutcome::Success.to_string(), "success");
        assert_eq!(CallOutcome::Timeout.as_str(), "timeout");

        let serialized = serde_json::to_string(&CallOutcome::Timeout).unwrap();
        assert_eq!(serialized, "\"timeout\"");

        let deserialized: CallOutcome = serde_json::from_str("\"failure\"").unwrap();
        assert_eq!(deserialized, CallOutcome::Failure);
    }
}
