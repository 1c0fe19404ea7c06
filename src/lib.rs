// Opsline - Client-Side Workflow Core for the Ops Console
// Status transitions, confirmation gating, and list consistency against one
// authoritative REST backend.

pub mod api;
pub mod config;
pub mod feedback;
pub mod list;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use api::{ApiClient, ApiError, ListQueryState, MutationStyle, Page, PageMeta, RestGateway, RetryPolicy};
pub use config::{config, init_config, OpslineConfig};
pub use feedback::{Feedback, FeedbackSink, TracingFeedback};
pub use list::{BulkReport, ListCoordinator, RefreshResult, TableSession};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflow::{
    allowed_targets, knows_status, requires_confirmation, validate, AutoConfirmGate, ChannelGate,
    ConfirmationGate, ConfirmationPrompt, EntityKind, GateDecision, ListGateway, RejectReason,
    StatusGateway, TransitionDispatcher, TransitionOutcome, TransitionRequest, WorkflowEntity,
};
