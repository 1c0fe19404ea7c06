// Wire types shared with the REST backend

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::workflow::types::{EntityKind, WorkflowEntity};

/// Standard `{ success, message, body }` wrapper on every response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub body: Option<T>,
}

/// Pagination block returned under `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub per_page: u32,
}

/// Body of a list fetch.
#[derive(Debug, Deserialize)]
pub struct ListBody {
    pub items: Vec<EntityBody>,
    pub data: PageMeta,
}

/// Entity as the server sends it. Status resources carry `status`; flag
/// resources carry `is_active`.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityBody {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl EntityBody {
    /// Fold both wire conventions into the one client-side model.
    pub fn into_entity(self, kind: EntityKind) -> Result<WorkflowEntity, ApiError> {
        let status = match (self.status, self.is_active) {
            (Some(status), _) => status,
            (None, Some(true)) => "visible".to_string(),
            (None, Some(false)) => "hidden".to_string(),
            (None, None) => {
                return Err(ApiError::Decode(format!(
                    "{kind} #{} carries neither status nor is_active",
                    self.id
                )))
            }
        };
        Ok(WorkflowEntity {
            id: self.id,
            kind,
            status,
            updated_at: self.updated_at,
        })
    }
}

/// One page of entities, folded to the client model.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<WorkflowEntity>,
    pub meta: PageMeta,
}

/// The caller's current pagination and filters. Owned by the table session;
/// the coordinator reads it and never writes filter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryState {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub status: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Default for ListQueryState {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            search: None,
            status: None,
            extra: BTreeMap::new(),
        }
    }
}

impl ListQueryState {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }

    /// Stable identity of this query; concurrent refreshes with the same
    /// signature coalesce into one fetch.
    pub fn signature(&self, kind: EntityKind) -> String {
        let mut sig = format!("{kind}?");
        for (key, value) in self.to_query() {
            sig.push_str(&key);
            sig.push('=');
            sig.push_str(&value);
            sig.push('&');
        }
        sig
    }
}
