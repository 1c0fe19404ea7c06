// List consistency: coalesced refreshes and the table session that owns the
// query state.

pub mod coordinator;
pub mod view;

pub use coordinator::{ListCoordinator, RefreshResult};
pub use view::{BulkReport, TableSession};
