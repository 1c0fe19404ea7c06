// Collaborator seams for the workflow engine - separated for testability

use async_trait::async_trait;

use crate::api::errors::ApiError;
use crate::api::types::{ListQueryState, Page};
use crate::workflow::types::{EntityKind, WorkflowEntity};

/// Backend mutations. One authoritative server; nothing changes client-side
/// ahead of its response.
#[async_trait]
pub trait StatusGateway: Send + Sync {
    /// Ask the backend to move the entity to `target`. Returns the entity as
    /// the server now sees it.
    async fn change_status(
        &self,
        kind: EntityKind,
        id: u64,
        target: &str,
    ) -> Result<WorkflowEntity, ApiError>;

    /// Delete one entity.
    async fn delete(&self, kind: EntityKind, id: u64) -> Result<(), ApiError>;
}

/// Paginated list reads.
#[async_trait]
pub trait ListGateway: Send + Sync {
    /// Fetch one page using the caller's exact filters.
    async fn fetch_page(
        &self,
        kind: EntityKind,
        query: &ListQueryState,
    ) -> Result<Page, ApiError>;
}
