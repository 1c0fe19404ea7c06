// Transition tables, one per entity kind.
//
// The graphs are forward-only: no edge returns to an earlier status, and a
// terminal status has no outgoing edges. Pairs that are not listed here fail
// closed and resolve to the empty set.

use crate::workflow::types::EntityKind;

/// Statuses reachable from `from` in one hop. Empty for terminal statuses and
/// for anything the registry does not know.
pub fn allowed_targets(kind: EntityKind, from: &str) -> &'static [&'static str] {
    match (kind, from) {
        (EntityKind::Duty, "pending") => &["approved", "completed"],
        (EntityKind::Duty, "approved") => &["completed"],
        (EntityKind::Duty, "completed") => &[],

        (EntityKind::Expense, "pending") => &["approved", "rejected"],
        (EntityKind::Expense, "approved") => &["completed", "paid"],
        (EntityKind::Expense, "rejected" | "completed" | "paid") => &[],

        (EntityKind::Leave, "pending") => &["approved", "rejected"],
        (EntityKind::Leave, "approved" | "rejected") => &[],

        // Complaint visibility: a two-state flag graph, both directions legal.
        (EntityKind::Complaint, "visible") => &["hidden"],
        (EntityKind::Complaint, "hidden") => &["visible"],

        _ => &[],
    }
}

/// Whether `status` is a state of `kind` at all. A status the backend added
/// but this table does not list is unknown, and mutation stays blocked.
pub fn knows_status(kind: EntityKind, status: &str) -> bool {
    matches!(
        (kind, status),
        (EntityKind::Duty, "pending" | "approved" | "completed")
            | (
                EntityKind::Expense,
                "pending" | "approved" | "rejected" | "completed" | "paid"
            )
            | (EntityKind::Leave, "pending" | "approved" | "rejected")
            | (EntityKind::Complaint, "visible" | "hidden")
    )
}

/// Whether the `(from, to)` edge needs the timed confirmation prompt.
/// Every registered forward edge is irreversible and gets the prompt;
/// restoring a hidden complaint is the one reversible, low-impact edge.
pub fn requires_confirmation(kind: EntityKind, from: &str, to: &str) -> bool {
    if !allowed_targets(kind, from).contains(&to) {
        return false;
    }
    !matches!((kind, from, to), (EntityKind::Complaint, "hidden", "visible"))
}
