// Time-boxed confirmation before irreversible transitions.
//
// The gate only answers "did the user agree"; applying the change stays with
// the dispatcher, so a slow network after a confirm can never look like a
// second confirmation round.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::workflow::types::{EntityKind, TransitionRequest};

/// Outcome of one confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Confirmed,
    Cancelled,
    /// The window elapsed without an answer. Distinct from a cancel so the
    /// caller can say so.
    Expired,
}

/// What the prompt describes: the entity (or batch), its current status, and
/// where it is going.
#[derive(Debug, Clone)]
pub struct ConfirmationPrompt {
    pub kind: EntityKind,
    pub entity_id: Option<u64>,
    pub current_status: Option<String>,
    pub target: String,
    pub count: usize,
    pub window: Duration,
}

impl ConfirmationPrompt {
    pub fn for_transition(request: &TransitionRequest) -> Self {
        Self {
            kind: request.entity.kind,
            entity_id: Some(request.entity.id),
            current_status: Some(request.entity.status.clone()),
            target: request.target_status.clone(),
            count: 1,
            window: request.confirmation_window,
        }
    }

    pub fn for_deletion(kind: EntityKind, count: usize, window: Duration) -> Self {
        Self {
            kind,
            entity_id: None,
            current_status: None,
            target: "deleted".to_string(),
            count,
            window,
        }
    }
}

impl fmt::Display for ConfirmationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.entity_id, self.current_status.as_deref()) {
            (Some(id), Some(from)) => write!(f, "{} #{}: {} -> {}", self.kind, id, from, self.target),
            _ => write!(f, "{} {}(s) -> {}", self.count, self.kind, self.target),
        }
    }
}

/// Presents a confirmation prompt and reports the user's answer.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Wait for the user's answer. Implementations may block indefinitely;
    /// the caller applies the time box.
    async fn confirm(&self, prompt: ConfirmationPrompt) -> GateDecision;
}

/// Apply the prompt's window around the gate. Elapse resolves to `Expired`,
/// never a silent confirm or a silent cancel.
pub async fn resolve_with_window<G>(gate: &G, prompt: ConfirmationPrompt) -> GateDecision
where
    G: ConfirmationGate + ?Sized,
{
    let window = prompt.window;
    match timeout(window, gate.confirm(prompt)).await {
        Ok(decision) => decision,
        Err(_) => GateDecision::Expired,
    }
}

/// Gate that approves everything. For headless flows and tests.
#[derive(Debug, Default)]
pub struct AutoConfirmGate;

#[async_trait]
impl ConfirmationGate for AutoConfirmGate {
    async fn confirm(&self, _prompt: ConfirmationPrompt) -> GateDecision {
        GateDecision::Confirmed
    }
}

/// A prompt handed to the UI listener, waiting for its answer.
pub struct PendingConfirmation {
    pub prompt: ConfirmationPrompt,
    answer: oneshot::Sender<bool>,
}

impl PendingConfirmation {
    pub fn resolve(self, confirmed: bool) {
        let _ = self.answer.send(confirmed);
    }
}

/// Gate that forwards each prompt to a UI listener and awaits the answer.
/// Dropping the listener or the pending prompt counts as a cancel.
pub struct ChannelGate {
    prompts: mpsc::Sender<PendingConfirmation>,
}

impl ChannelGate {
    /// Returns the gate plus the receiver end the UI drains.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<PendingConfirmation>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { prompts: tx }, rx)
    }
}

#[async_trait]
impl ConfirmationGate for ChannelGate {
    async fn confirm(&self, prompt: ConfirmationPrompt) -> GateDecision {
        let (tx, rx) = oneshot::channel();
        let pending = PendingConfirmation { prompt, answer: tx };
        if self.prompts.send(pending).await.is_err() {
            return GateDecision::Cancelled;
        }
        match rx.await {
            Ok(true) => GateDecision::Confirmed,
            Ok(false) | Err(_) => GateDecision::Cancelled,
        }
    }
}
