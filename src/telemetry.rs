use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::workflow::types::EntityKind;

/// Initialize structured logging for the console core.
/// JSON output keeps dispatch attempts greppable by correlation id.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("opsline telemetry initialized");
    Ok(())
}

/// Correlation id linking one dispatch attempt across gate, mutation, and
/// refresh.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one transition attempt.
pub fn create_dispatch_span(
    kind: EntityKind,
    entity_id: u64,
    target: &str,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "transition_dispatch",
        entity.kind = %kind,
        entity.id = entity_id,
        target = target,
        correlation.id = correlation_id,
    )
}

/// Shutdown telemetry gracefully.
pub fn shutdown_telemetry() {
    tracing::info!("opsline telemetry shutdown complete");
}
