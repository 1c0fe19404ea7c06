// Per-kind wire conventions for mutations, and the REST-backed gateways.
//
// Two conventions coexist on the backend: status resources take the target as
// a query parameter on a GET, flag resources take a boolean PATCH body. The
// engine never assumes one shape; the adapter decides per kind.

use async_trait::async_trait;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::retry::RetryPolicy;
use crate::api::types::{EntityBody, ListBody, ListQueryState, Page};
use crate::workflow::traits::{ListGateway, StatusGateway};
use crate::workflow::types::{EntityKind, WorkflowEntity};

/// How a kind's status mutation goes over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStyle {
    /// `GET /{resource}/{id}/change-status?status={target}`
    StatusQuery,
    /// `PATCH /{resource}/{id}/change-status` with a boolean flag body
    FlagPatch { flag: &'static str },
}

/// Collection path for a kind.
pub fn resource(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Duty => "duties",
        EntityKind::Expense => "expenses",
        EntityKind::Leave => "leaves",
        EntityKind::Complaint => "complaints",
    }
}

pub fn mutation_style(kind: EntityKind) -> MutationStyle {
    match kind {
        EntityKind::Complaint => MutationStyle::FlagPatch { flag: "is_active" },
        _ => MutationStyle::StatusQuery,
    }
}

fn flag_value(target: &str) -> Result<bool, ApiError> {
    match target {
        "visible" => Ok(true),
        "hidden" => Ok(false),
        other => Err(ApiError::Rejected(format!(
            "'{other}' is not a visibility value"
        ))),
    }
}

/// The real collaborator: REST calls through `ApiClient`.
pub struct RestGateway {
    client: ApiClient,
    retry: RetryPolicy,
}

impl RestGateway {
    pub fn new(client: ApiClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl StatusGateway for RestGateway {
    async fn change_status(
        &self,
        kind: EntityKind,
        id: u64,
        target: &str,
    ) -> Result<WorkflowEntity, ApiError> {
        let path = format!("{}/{}/change-status", resource(kind), id);
        let body: EntityBody = match mutation_style(kind) {
            MutationStyle::StatusQuery => {
                let query = [("status".to_string(), target.to_string())];
                self.client.get(&path, &query).await?
            }
            MutationStyle::FlagPatch { flag } => {
                let mut payload = serde_json::Map::new();
                payload.insert(flag.to_string(), serde_json::Value::Bool(flag_value(target)?));
                self.client.patch(&path, &payload).await?
            }
        };
        info!(kind = %kind, id, target, "status mutation acknowledged");
        body.into_entity(kind)
    }

    async fn delete(&self, kind: EntityKind, id: u64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("{}/{}", resource(kind), id))
            .await
    }
}

#[async_trait]
impl ListGateway for RestGateway {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        query: &ListQueryState,
    ) -> Result<Page, ApiError> {
        let path = resource(kind);
        let pairs = query.to_query();
        let body: ListBody = self.retry.run(|| self.client.get(path, &pairs)).await?;
        let items = body
            .items
            .into_iter()
            .map(|item| item.into_entity(kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            meta: body.data,
        })
    }
}
