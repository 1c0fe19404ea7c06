// Orchestrates one transition attempt: validate, gate, submit, interpret.
//
// No client-side state is mutated ahead of the server's response; a failure
// leaves the entity at its last known-good state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use statig::prelude::IntoStateMachineExt;
use tracing::Instrument;

use crate::api::errors::ApiError;
use crate::feedback::{Feedback, FeedbackSink};
use crate::telemetry::{create_dispatch_span, generate_correlation_id};
use crate::workflow::gate::{self, ConfirmationGate, ConfirmationPrompt, GateDecision};
use crate::workflow::state_machine::{DispatchEvent, DispatchMachine};
use crate::workflow::traits::StatusGateway;
use crate::workflow::types::{EntityKind, RejectReason, TransitionOutcome, TransitionRequest};
use crate::workflow::validator;

type EntityKey = (EntityKind, u64);

/// Drives transitions end to end. One instance serves any number of entities;
/// attempts on the same entity are serialized through the in-flight set while
/// different entities proceed concurrently.
pub struct TransitionDispatcher<G, C> {
    gateway: Arc<G>,
    gate: Arc<C>,
    feedback: Arc<dyn FeedbackSink>,
    in_flight: Mutex<HashSet<EntityKey>>,
}

impl<G, C> TransitionDispatcher<G, C>
where
    G: StatusGateway,
    C: ConfirmationGate,
{
    pub fn new(gateway: Arc<G>, gate: Arc<C>, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self {
            gateway,
            gate,
            feedback,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Run one attempt. Returns `None` when a dispatch for the same entity is
    /// already active: the extra click is ignored, not queued.
    pub async fn dispatch(&self, request: TransitionRequest) -> Option<TransitionOutcome> {
        let key = (request.entity.kind, request.entity.id);
        let _slot = match InFlightSlot::acquire(&self.in_flight, key) {
            Some(slot) => slot,
            None => {
                tracing::debug!(
                    kind = %request.entity.kind,
                    entity_id = request.entity.id,
                    "dispatch already in flight; click ignored"
                );
                return None;
            }
        };

        let correlation_id = generate_correlation_id();
        let span = create_dispatch_span(
            request.entity.kind,
            request.entity.id,
            &request.target_status,
            &correlation_id,
        );
        Some(self.run_attempt(request, &correlation_id).instrument(span).await)
    }

    async fn run_attempt(
        &self,
        request: TransitionRequest,
        correlation_id: &str,
    ) -> TransitionOutcome {
        let entity = &request.entity;
        let mut machine =
            DispatchMachine::new(entity.kind, entity.id, &request.target_status, correlation_id)
                .state_machine();
        machine.handle(&DispatchEvent::Begin);

        if let Err(reason) = validator::validate(entity, &request.target_status) {
            machine.handle(&DispatchEvent::Deny);
            self.feedback.publish(Feedback::error(reason.to_string()));
            return TransitionOutcome::Rejected(reason);
        }
        machine.handle(&DispatchEvent::Allow {
            needs_confirmation: request.requires_confirmation,
        });

        if request.requires_confirmation {
            let prompt = ConfirmationPrompt::for_transition(&request);
            match gate::resolve_with_window(self.gate.as_ref(), prompt).await {
                GateDecision::Confirmed => {
                    machine.handle(&DispatchEvent::Confirm);
                }
                GateDecision::Cancelled => {
                    machine.handle(&DispatchEvent::Cancel);
                    self.feedback.publish(Feedback::info("Cancelled"));
                    return TransitionOutcome::Cancelled;
                }
                GateDecision::Expired => {
                    machine.handle(&DispatchEvent::Expire);
                    self.feedback.publish(Feedback::info("Confirmation expired"));
                    return TransitionOutcome::Expired;
                }
            }
        }

        match self
            .gateway
            .change_status(entity.kind, entity.id, &request.target_status)
            .await
        {
            Ok(updated) if updated.status == request.target_status => {
                machine.handle(&DispatchEvent::Applied);
                self.feedback.publish(Feedback::success(format!(
                    "{} #{} is now {}",
                    entity.kind, entity.id, updated.status
                )));
                TransitionOutcome::Applied(updated)
            }
            Ok(updated) => {
                // the server answered with a different state than requested
                machine.handle(&DispatchEvent::Fail);
                let reason = RejectReason::ServerError(format!(
                    "server reports status '{}' after a request for '{}'",
                    updated.status, request.target_status
                ));
                self.feedback.publish(Feedback::error(reason.to_string()));
                TransitionOutcome::Rejected(reason)
            }
            Err(err) => {
                machine.handle(&DispatchEvent::Fail);
                let reason = reject_reason(err);
                self.feedback.publish(Feedback::error(reason.to_string()));
                TransitionOutcome::Rejected(reason)
            }
        }
    }

    /// Whether a dispatch for this entity is currently active. The UI can use
    /// this to keep the triggering control disabled.
    pub fn is_in_flight(&self, kind: EntityKind, id: u64) -> bool {
        self.lock_in_flight().contains(&(kind, id))
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashSet<EntityKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn reject_reason(err: ApiError) -> RejectReason {
    match err {
        ApiError::Rejected(message) => RejectReason::ValidationError(message),
        other => RejectReason::ServerError(other.to_string()),
    }
}

/// Slot in the per-entity in-flight set, released on drop.
struct InFlightSlot<'a> {
    set: &'a Mutex<HashSet<EntityKey>>,
    key: EntityKey,
}

impl<'a> InFlightSlot<'a> {
    fn acquire(set: &'a Mutex<HashSet<EntityKey>>, key: EntityKey) -> Option<Self> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        let inserted = guard.insert(key);
        drop(guard);
        inserted.then(|| InFlightSlot { set, key })
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
