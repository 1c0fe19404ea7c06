use statig::prelude::*;

use crate::workflow::types::EntityKind;

/// Events that drive one dispatch attempt through its phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Begin,
    Allow { needs_confirmation: bool },
    Deny,
    Confirm,
    Cancel,
    Expire,
    Applied,
    Fail,
}

/// Phase tracker for a single transition attempt.
///
/// One machine per attempt: `Idle -> Validating -> (Denied |
/// AwaitingConfirmation) -> (Cancelled | Expired | Submitting) -> (Applied |
/// Failed)`. Events that do not fit the current phase are ignored.
#[derive(Default)]
pub struct DispatchMachine {
    pub kind: Option<EntityKind>,
    pub entity_id: u64,
    pub target: String,
    pub correlation_id: String,
    settled_as: Option<&'static str>,
}

impl DispatchMachine {
    pub fn new(kind: EntityKind, entity_id: u64, target: &str, correlation_id: &str) -> Self {
        Self {
            kind: Some(kind),
            entity_id,
            target: target.to_string(),
            correlation_id: correlation_id.to_string(),
            ..Default::default()
        }
    }

    /// Terminal phase label, once the attempt has settled.
    pub fn settled_as(&self) -> Option<&'static str> {
        self.settled_as
    }

    pub fn is_settled(&self) -> bool {
        self.settled_as.is_some()
    }

    fn settle(&mut self, label: &'static str) {
        self.settled_as = Some(label);
        tracing::info!(
            kind = ?self.kind,
            entity_id = %self.entity_id,
            target = %self.target,
            correlation_id = %self.correlation_id,
            outcome = %label,
            "transition attempt settled"
        );
    }
}

#[state_machine(initial = "State::idle()")]
impl DispatchMachine {
    #[state]
    fn idle(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Begin => {
                tracing::debug!(
                    kind = ?self.kind,
                    entity_id = %self.entity_id,
                    target = %self.target,
                    "validating transition"
                );
                Transition(State::validating())
            }
            _ => Handled,
        }
    }

    #[state]
    fn validating(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Allow {
                needs_confirmation: true,
            } => Transition(State::awaiting_confirmation()),
            DispatchEvent::Allow {
                needs_confirmation: false,
            } => Transition(State::submitting()),
            DispatchEvent::Deny => {
                self.settle("denied");
                Transition(State::denied())
            }
            _ => Handled,
        }
    }

    #[state]
    fn awaiting_confirmation(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Confirm => Transition(State::submitting()),
            DispatchEvent::Cancel => {
                self.settle("cancelled");
                Transition(State::cancelled())
            }
            DispatchEvent::Expire => {
                self.settle("expired");
                Transition(State::expired())
            }
            _ => Handled,
        }
    }

    #[state]
    fn submitting(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Applied => {
                self.settle("applied");
                Transition(State::applied())
            }
            DispatchEvent::Fail => {
                self.settle("failed");
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn denied(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }

    #[state]
    fn cancelled(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }

    #[state]
    fn expired(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }

    #[state]
    fn applied(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }

    #[state]
    fn failed(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            _ => Handled,
        }
    }
}
