// Recording mocks for the workflow collaborators - no side effects

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::errors::ApiError;
use crate::api::types::{ListQueryState, Page, PageMeta};
use crate::feedback::{Feedback, FeedbackSink};
use crate::workflow::gate::{ConfirmationGate, ConfirmationPrompt, GateDecision};
use crate::workflow::traits::{ListGateway, StatusGateway};
use crate::workflow::types::{EntityKind, WorkflowEntity};

/// Status gateway that replays scripted results and records every call.
/// With nothing scripted it answers the way a healthy backend would: the
/// entity at the requested status.
pub struct MockStatusGateway {
    scripted: Mutex<VecDeque<Result<WorkflowEntity, ApiError>>>,
    latency: Option<Duration>,
    pub status_calls: Mutex<Vec<(EntityKind, u64, String)>>,
    pub delete_calls: Mutex<Vec<(EntityKind, u64)>>,
    failing_deletes: Mutex<HashSet<u64>>,
}

impl Default for MockStatusGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStatusGateway {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            latency: None,
            status_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            failing_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    pub fn push_result(&self, result: Result<WorkflowEntity, ApiError>) {
        self.scripted.lock().unwrap().push_back(result);
    }

    pub fn fail_delete(&self, id: u64) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StatusGateway for MockStatusGateway {
    async fn change_status(
        &self,
        kind: EntityKind,
        id: u64,
        target: &str,
    ) -> Result<WorkflowEntity, ApiError> {
        self.status_calls
            .lock()
            .unwrap()
            .push((kind, id, target.to_string()));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(result) = self.scripted.lock().unwrap().pop_front() {
            return result;
        }
        Ok(WorkflowEntity {
            id,
            kind,
            status: target.to_string(),
            updated_at: Utc::now(),
        })
    }

    async fn delete(&self, kind: EntityKind, id: u64) -> Result<(), ApiError> {
        self.delete_calls.lock().unwrap().push((kind, id));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing_deletes.lock().unwrap().contains(&id) {
            return Err(ApiError::Server("HTTP 500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}

/// List gateway serving pages keyed by page number.
pub struct MockListGateway {
    pages: Mutex<HashMap<u32, Page>>,
    latency: Option<Duration>,
    pub fetches: Mutex<Vec<ListQueryState>>,
}

impl Default for MockListGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockListGateway {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            latency: None,
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    pub fn set_page(&self, page: u32, content: Page) {
        self.pages.lock().unwrap().insert(page, content);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl ListGateway for MockListGateway {
    async fn fetch_page(
        &self,
        _kind: EntityKind,
        query: &ListQueryState,
    ) -> Result<Page, ApiError> {
        self.fetches.lock().unwrap().push(query.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.pages
            .lock()
            .unwrap()
            .get(&query.page)
            .cloned()
            .ok_or_else(|| ApiError::Server(format!("no page {} scripted", query.page)))
    }
}

/// Gate that answers with a fixed decision, optionally after a delay.
pub struct ScriptedGate {
    decision: GateDecision,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<ConfirmationPrompt>>,
}

impl ScriptedGate {
    pub fn answering(decision: GateDecision) -> Self {
        Self {
            decision,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering_after(decision: GateDecision, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering(decision)
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ConfirmationGate for ScriptedGate {
    async fn confirm(&self, prompt: ConfirmationPrompt) -> GateDecision {
        self.prompts.lock().unwrap().push(prompt);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.decision
    }
}

/// Feedback sink that stores everything published.
#[derive(Default)]
pub struct RecordingFeedback {
    pub published: Mutex<Vec<Feedback>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Feedback> {
        self.published.lock().unwrap().clone()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn publish(&self, feedback: Feedback) {
        self.published.lock().unwrap().push(feedback);
    }
}

pub fn duty(id: u64, status: &str) -> WorkflowEntity {
    WorkflowEntity {
        id,
        kind: EntityKind::Duty,
        status: status.to_string(),
        updated_at: Utc::now(),
    }
}

pub fn expense(id: u64, status: &str) -> WorkflowEntity {
    WorkflowEntity {
        id,
        kind: EntityKind::Expense,
        status: status.to_string(),
        updated_at: Utc::now(),
    }
}

pub fn complaint(id: u64, status: &str) -> WorkflowEntity {
    WorkflowEntity {
        id,
        kind: EntityKind::Complaint,
        status: status.to_string(),
        updated_at: Utc::now(),
    }
}

pub fn page_of(
    items: Vec<WorkflowEntity>,
    current_page: u32,
    last_page: u32,
    total: u64,
    per_page: u32,
) -> Page {
    Page {
        items,
        meta: PageMeta {
            current_page,
            last_page,
            total,
            per_page,
        },
    }
}
