// Table session: owns the query state and selection, wires dispatch outcomes
// to refreshes. One session per visible table.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::api::errors::ApiError;
use crate::api::types::{ListQueryState, PageMeta};
use crate::feedback::{Feedback, FeedbackSink};
use crate::list::coordinator::ListCoordinator;
use crate::workflow::dispatcher::TransitionDispatcher;
use crate::workflow::gate::{self, ConfirmationGate, ConfirmationPrompt, GateDecision};
use crate::workflow::traits::{ListGateway, StatusGateway};
use crate::workflow::types::{EntityKind, TransitionOutcome, TransitionRequest, WorkflowEntity};

/// Result of a multi-select operation. Partial failures are counted and
/// reported, never swallowed.
#[derive(Debug)]
pub struct BulkReport {
    pub requested: usize,
    pub succeeded: Vec<u64>,
    pub failed: Vec<(u64, ApiError)>,
}

impl BulkReport {
    pub fn summary(&self, noun: &str) -> String {
        format!(
            "{} of {} {}(s) deleted",
            self.succeeded.len(),
            self.requested,
            noun
        )
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One table view over one entity kind. Owns its `ListQueryState`; a refresh
/// keeps the user's page and filters, and only the empty-page fallback may
/// move the page.
pub struct TableSession<G, C, L> {
    kind: EntityKind,
    pub query: ListQueryState,
    items: Vec<WorkflowEntity>,
    meta: Option<PageMeta>,
    selection: BTreeSet<u64>,
    gateway: Arc<G>,
    dispatcher: Arc<TransitionDispatcher<G, C>>,
    coordinator: Arc<ListCoordinator<L>>,
    gate: Arc<C>,
    feedback: Arc<dyn FeedbackSink>,
    confirmation_window: Duration,
}

impl<G, C, L> TableSession<G, C, L>
where
    G: StatusGateway,
    C: ConfirmationGate,
    L: ListGateway,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EntityKind,
        gateway: Arc<G>,
        dispatcher: Arc<TransitionDispatcher<G, C>>,
        coordinator: Arc<ListCoordinator<L>>,
        gate: Arc<C>,
        feedback: Arc<dyn FeedbackSink>,
        confirmation_window: Duration,
    ) -> Self {
        Self {
            kind,
            query: ListQueryState::default(),
            items: Vec::new(),
            meta: None,
            selection: BTreeSet::new(),
            gateway,
            dispatcher,
            coordinator,
            gate,
            feedback,
            confirmation_window,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn items(&self) -> &[WorkflowEntity] {
        &self.items
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.as_ref()
    }

    pub fn selection(&self) -> &BTreeSet<u64> {
        &self.selection
    }

    pub fn select(&mut self, id: u64) {
        if self.items.iter().any(|entity| entity.id == id) {
            self.selection.insert(id);
        }
    }

    pub fn deselect(&mut self, id: u64) {
        self.selection.remove(&id);
    }

    /// Load or re-load the current page. Fetch failures become feedback, not
    /// panics in rendering code.
    pub async fn reload(&mut self) {
        match self.coordinator.refresh(self.kind, &self.query).await {
            Ok(page) => {
                // the one sanctioned page change: the fallback after deletions
                self.query.page = page.meta.current_page;
                self.items = page.items;
                self.meta = Some(page.meta);
            }
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "list refresh failed");
                self.feedback
                    .publish(Feedback::error(format!("Could not refresh the list: {err}")));
            }
        }
    }

    /// Menu-click entry point: dispatch the transition, refresh on success.
    /// Returns `None` for rows not on this page and for ignored re-clicks.
    pub async fn request_transition(
        &mut self,
        entity_id: u64,
        target: &str,
    ) -> Option<TransitionOutcome> {
        let entity = match self.items.iter().find(|entity| entity.id == entity_id) {
            Some(entity) => entity.clone(),
            None => {
                warn!(
                    kind = %self.kind,
                    entity_id,
                    "transition requested for a row not on this page"
                );
                return None;
            }
        };
        let request = TransitionRequest::new(&entity, target, self.confirmation_window);
        let outcome = self.dispatcher.dispatch(request).await?;
        if outcome.is_applied() {
            self.reload().await;
        }
        Some(outcome)
    }

    /// Delete every selected row: one confirmation for the batch, sequential
    /// deletes, exactly one refresh at the end. Selection is cleared only for
    /// rows that are actually gone.
    pub async fn delete_selected(&mut self) -> Option<BulkReport> {
        let ids: Vec<u64> = self.selection.iter().copied().collect();
        self.delete_ids(ids).await
    }

    /// Single-row delete, same gate and refresh rules as the bulk path.
    pub async fn delete_row(&mut self, id: u64) -> Option<BulkReport> {
        self.delete_ids(vec![id]).await
    }

    async fn delete_ids(&mut self, ids: Vec<u64>) -> Option<BulkReport> {
        if ids.is_empty() {
            return None;
        }
        let prompt = ConfirmationPrompt::for_deletion(self.kind, ids.len(), self.confirmation_window);
        match gate::resolve_with_window(self.gate.as_ref(), prompt).await {
            GateDecision::Confirmed => {}
            GateDecision::Cancelled => {
                self.feedback.publish(Feedback::info("Cancelled"));
                return None;
            }
            GateDecision::Expired => {
                self.feedback.publish(Feedback::info("Confirmation expired"));
                return None;
            }
        }

        let mut report = BulkReport {
            requested: ids.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for id in ids {
            match self.gateway.delete(self.kind, id).await {
                Ok(()) => {
                    report.succeeded.push(id);
                    self.selection.remove(&id);
                }
                Err(err) => {
                    warn!(kind = %self.kind, id, error = %err, "delete failed");
                    report.failed.push((id, err));
                }
            }
        }

        let summary = report.summary(self.kind.as_str());
        if report.is_complete() {
            self.feedback.publish(Feedback::success(summary));
        } else {
            self.feedback.publish(Feedback::error(summary));
        }
        // one refresh for the whole batch
        self.reload().await;
        Some(report)
    }
}
