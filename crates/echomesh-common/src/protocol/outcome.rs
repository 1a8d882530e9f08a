use serde::{Deserialize, Serialize};

use crate::protocol::error::MeshError;

/// Terminal result of one dispatched call.
///
/// Exactly one outcome is produced per inbound request: either the single
/// reply a worker computed for it, or one of the three failure kinds. A
/// timeout is an explicit outcome, never silence, and no outcome transitions
/// into another one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A worker produced the reply before the deadline.
    Success { reply: String },
    /// The deadline elapsed before any reply arrived. A reply that shows up
    /// afterwards is discarded, not delivered.
    Timeout,
    /// The routing pool had zero reachable workers at dispatch time.
    NoAvailableTarget,
    /// The request could not be delivered to the selected worker.
    RoutingFailure { detail: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }

    /// Stable label used for metrics tallies and span fields.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Success { .. } => "success",
            DispatchOutcome::Timeout => "timeout",
            DispatchOutcome::NoAvailableTarget => "no_available_target",
            DispatchOutcome::RoutingFailure { .. } => "routing_failure",
        }
    }
}

impl From<MeshError> for DispatchOutcome {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::Timeout(_) => DispatchOutcome::Timeout,
            MeshError::NoAvailableTarget => DispatchOutcome::NoAvailableTarget,
            MeshError::Routing(detail) => DispatchOutcome::RoutingFailure { detail },
            other => DispatchOutcome::RoutingFailure {
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_round_trips_reply() {
        let outcome = DispatchOutcome::Success {
            reply: "hi! hit from abc".to_string(),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.label(), "success");
    }

    #[test]
    fn test_failure_labels() {
        assert_eq!(DispatchOutcome::Timeout.label(), "timeout");
        assert_eq!(
            DispatchOutcome::NoAvailableTarget.label(),
            "no_available_target"
        );
        assert_eq!(
            DispatchOutcome::RoutingFailure {
                detail: "x".to_string()
            }
            .label(),
            "routing_failure"
        );
    }

    #[test]
    fn test_from_error_mapping() {
        assert_eq!(
            DispatchOutcome::from(MeshError::Timeout(5000)),
            DispatchOutcome::Timeout
        );
        assert_eq!(
            DispatchOutcome::from(MeshError::NoAvailableTarget),
            DispatchOutcome::NoAvailableTarget
        );
        assert_eq!(
            DispatchOutcome::from(MeshError::Routing("worker-1 is unreachable".to_string())),
            DispatchOutcome::RoutingFailure {
                detail: "worker-1 is unreachable".to_string()
            }
        );
    }

    #[test]
    fn test_serde_tagging() {
        let outcome = DispatchOutcome::Success {
            reply: "hi! x".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["reply"], "hi! x");

        let back: DispatchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}
