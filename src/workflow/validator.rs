// Pure validation for a candidate transition. No I/O, no side effects.

use crate::workflow::registry;
use crate::workflow::types::{RejectReason, WorkflowEntity};

/// Decide whether `entity` may move to `target`, without touching the network.
///
/// Denials are ordered: an unrecognized current status wins over everything
/// (the UI must be able to tell "update the client" apart from "illegal
/// move"), then no-op transitions and unreachable targets.
pub fn validate(entity: &WorkflowEntity, target: &str) -> Result<(), RejectReason> {
    if !registry::knows_status(entity.kind, &entity.status) {
        return Err(RejectReason::UnknownStatus {
            kind: entity.kind,
            status: entity.status.clone(),
        });
    }
    if entity.status == target
        || !registry::allowed_targets(entity.kind, &entity.status).contains(&target)
    {
        return Err(RejectReason::InvalidTransition {
            kind: entity.kind,
            from: entity.status.clone(),
            to: target.to_string(),
        });
    }
    Ok(())
}
