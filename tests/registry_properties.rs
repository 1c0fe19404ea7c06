//! Fail-closed properties of the transition registry and validator.

use chrono::Utc;
use proptest::prelude::*;

use opsline::workflow::registry::{allowed_targets, knows_status, requires_confirmation};
use opsline::workflow::types::{EntityKind, WorkflowEntity};
use opsline::workflow::validator::validate;

const KINDS: [EntityKind; 4] = [
    EntityKind::Duty,
    EntityKind::Expense,
    EntityKind::Leave,
    EntityKind::Complaint,
];

fn entity(kind: EntityKind, status: &str) -> WorkflowEntity {
    WorkflowEntity {
        id: 1,
        kind,
        status: status.to_string(),
        updated_at: Utc::now(),
    }
}

proptest! {
    // Anything the registry does not list resolves to the empty set.
    #[test]
    fn unlisted_statuses_have_no_targets(status in "[a-z_]{1,16}", kind_idx in 0usize..4) {
        let kind = KINDS[kind_idx];
        prop_assume!(!knows_status(kind, &status));
        prop_assert!(allowed_targets(kind, &status).is_empty());
    }

    // No-op transitions are rejected for every status string, known or not.
    #[test]
    fn no_op_transitions_are_always_denied(status in "[a-z_]{1,16}", kind_idx in 0usize..4) {
        let kind = KINDS[kind_idx];
        prop_assert!(validate(&entity(kind, &status), &status).is_err());
    }

    // Confirmation is a property of legal edges only.
    #[test]
    fn unreachable_edges_never_require_confirmation(
        from in "[a-z_]{1,16}",
        to in "[a-z_]{1,16}",
        kind_idx in 0usize..4,
    ) {
        let kind = KINDS[kind_idx];
        prop_assume!(!allowed_targets(kind, &from).contains(&to.as_str()));
        prop_assert!(!requires_confirmation(kind, &from, &to));
    }

    // Every listed target leads to a status the registry also knows, so a
    // successful transition can always be validated again afterwards.
    #[test]
    fn listed_targets_are_themselves_known(kind_idx in 0usize..4) {
        let kind = KINDS[kind_idx];
        for from in ["pending", "approved", "rejected", "completed", "paid", "visible", "hidden"] {
            for target in allowed_targets(kind, from) {
                prop_assert!(knows_status(kind, target));
            }
        }
    }
}
