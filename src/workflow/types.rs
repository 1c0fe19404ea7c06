// Core types for the status-transition workflow engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Entity kinds whose records carry a workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Duty,
    Expense,
    Leave,
    Complaint,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Duty => "duty",
            EntityKind::Expense => "expense",
            EntityKind::Leave => "leave",
            EntityKind::Complaint => "complaint",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record as the client knows it. `status` is only ever written through the
/// dispatcher; `updated_at` is display/ordering data, not a conflict token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntity {
    pub id: u64,
    pub kind: EntityKind,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// One transition attempt. Created by the UI, consumed by the dispatcher.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub entity: WorkflowEntity,
    pub target_status: String,
    pub requires_confirmation: bool,
    pub confirmation_window: Duration,
}

impl TransitionRequest {
    /// Build a request for `entity` -> `target`, consulting the registry for
    /// the confirmation flag of that edge.
    pub fn new(entity: &WorkflowEntity, target: &str, window: Duration) -> Self {
        Self {
            requires_confirmation: crate::workflow::registry::requires_confirmation(
                entity.kind,
                &entity.status,
                target,
            ),
            entity: entity.clone(),
            target_status: target.to_string(),
            confirmation_window: window,
        }
    }

    /// Same, with the configured confirmation window.
    pub fn with_default_window(entity: &WorkflowEntity, target: &str) -> Self {
        Self::new(entity, target, crate::config::config().confirmation_window())
    }
}

/// Why a transition attempt did not apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Target unreachable from the current status; decided locally.
    #[error("{kind} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        kind: EntityKind,
        from: String,
        to: String,
    },
    /// Current status not in the registry; fail closed until it is.
    #[error("{kind} status '{status}' is not recognized; the record can be viewed but not changed")]
    UnknownStatus { kind: EntityKind, status: String },
    /// The server rejected the request; message passed through verbatim.
    #[error("{0}")]
    ValidationError(String),
    /// Network failure, timeout, or server-side error. Retryable.
    #[error("request failed: {0}")]
    ServerError(String),
}

/// Terminal result of one dispatch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The server applied the change; this is exactly what it returned.
    Applied(WorkflowEntity),
    Rejected(RejectReason),
    /// The user declined the confirmation prompt.
    Cancelled,
    /// The confirmation window elapsed without an answer.
    Expired,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn duty(status: &str) -> WorkflowEntity {
        WorkflowEntity {
            id: 7,
            kind: EntityKind::Duty,
            status: status.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn request_picks_up_confirmation_flag_from_registry() {
        let window = Duration::from_millis(5000);
        let request = TransitionRequest::new(&duty("pending"), "completed", window);
        assert!(request.requires_confirmation);
        assert_eq!(request.target_status, "completed");
        assert_eq!(request.confirmation_window, window);
    }

    #[test]
    fn request_for_unregistered_edge_needs_no_confirmation() {
        let request = TransitionRequest::new(&duty("completed"), "pending", Duration::ZERO);
        assert!(!request.requires_confirmation);
    }

    #[test]
    fn default_window_comes_from_configuration() {
        let request = TransitionRequest::with_default_window(&duty("pending"), "approved");
        assert_eq!(request.confirmation_window, Duration::from_millis(5_000));
    }

    #[test]
    fn entity_kind_display_matches_wire_casing() {
        assert_eq!(EntityKind::Duty.to_string(), "duty");
        assert_eq!(EntityKind::Complaint.to_string(), "complaint");
    }
}
