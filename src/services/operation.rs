use crate::error::ApiError;
use crate::events::EventHub;
use crate::types::{OperationEvent, OperationKind};
use std::future::Future;

/// What to announce around one tracked call.
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    target_id: Option<String>,
    success_message: Option<&'static str>,
    failure_message: &'static str,
}

impl Operation {
    pub fn new(kind: OperationKind, failure_message: &'static str) -> Self {
        Self {
            kind,
            target_id: None,
            success_message: None,
            failure_message,
        }
    }

    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    /// Completion toast; without one the operation completes silently.
    pub fn on_success(mut self, message: &'static str) -> Self {
        self.success_message = Some(message);
        self
    }
}

/// Wraps calls in the IN_PROGRESS -> COMPLETED | ERROR event sequence.
#[derive(Clone)]
pub struct OperationTracker {
    hub: EventHub,
}

impl OperationTracker {
    pub fn new(hub: EventHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub async fn track<T, F>(&self, op: Operation, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.hub.send_event(
            OperationEvent::in_progress(op.kind).with_target(op.target_id.clone()),
        );

        let result = call.await;

        let terminal = match &result {
            Ok(_) => {
                let event = OperationEvent::completed(op.kind).with_target(op.target_id);
                match op.success_message {
                    Some(message) => event.with_message(message).with_toast(true),
                    None => event,
                }
            }
            Err(err) => OperationEvent::error(op.kind)
                .with_target(op.target_id)
                .with_message(err.server_message().unwrap_or(op.failure_message))
                .with_toast(true),
        };
        debug_assert!(terminal.phase.is_terminal());
        self.hub.send_event(terminal);

        result
    }
}
