use super::hub::{EventHub, Subscription};
use crate::types::{EventPhase, OperationEvent, OperationKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub trait ToastSink: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogToastSink;

impl ToastSink for LogToastSink {
    fn success(&self, message: &str) {
        info!(toast = message, "Operation succeeded");
    }

    fn error(&self, message: &str) {
        warn!(toast = message, "Operation failed");
    }
}

type Handler = Arc<dyn Fn(&OperationEvent) + Send + Sync>;

/// One routing table for every UI consumer: toasts by phase, then handlers
/// registered per kind or per `(kind, phase)`.
pub struct EventDispatcher {
    toasts: Arc<dyn ToastSink>,
    by_kind: HashMap<OperationKind, Vec<Handler>>,
    by_phase: HashMap<(OperationKind, EventPhase), Vec<Handler>>,
}

impl EventDispatcher {
    pub fn new(toasts: Arc<dyn ToastSink>) -> Self {
        Self {
            toasts,
            by_kind: HashMap::new(),
            by_phase: HashMap::new(),
        }
    }

    /// Runs for every phase of `kind`.
    pub fn on_kind<F>(mut self, kind: OperationKind, handler: F) -> Self
    where
        F: Fn(&OperationEvent) + Send + Sync + 'static,
    {
        self.by_kind.entry(kind).or_default().push(Arc::new(handler));
        self
    }

    pub fn on<F>(mut self, kind: OperationKind, phase: EventPhase, handler: F) -> Self
    where
        F: Fn(&OperationEvent) + Send + Sync + 'static,
    {
        self.by_phase
            .entry((kind, phase))
            .or_default()
            .push(Arc::new(handler));
        self
    }

    pub fn dispatch(&self, event: &OperationEvent) {
        match event.phase {
            EventPhase::Completed => {
                if let Some(message) = event.message.as_deref().filter(|_| event.toast) {
                    self.toasts.success(message);
                }
            }
            EventPhase::Error => {
                if let Some(message) = event.message.as_deref().filter(|_| event.toast) {
                    self.toasts.error(message);
                }
            }
            EventPhase::InProgress | EventPhase::Default => {}
        }

        let phase_handlers = self.by_phase.get(&(event.kind, event.phase));
        let kind_handlers = self.by_kind.get(&event.kind);
        for handler in phase_handlers.into_iter().chain(kind_handlers).flatten() {
            handler(event);
        }
    }

    pub fn attach(self, hub: &EventHub) -> Subscription {
        let dispatcher = Arc::new(self);
        hub.subscribe(move |event| dispatcher.dispatch(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingToasts {
        shown: Mutex<Vec<(bool, String)>>,
    }

    impl ToastSink for RecordingToasts {
        fn success(&self, message: &str) {
            self.shown.lock().push((true, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.shown.lock().push((false, message.to_string()));
        }
    }

    #[test]
    fn toasts_follow_phase_and_flag() {
        let toasts = Arc::new(RecordingToasts::default());
        let dispatcher = EventDispatcher::new(toasts.clone());

        dispatcher.dispatch(
            &OperationEvent::completed(OperationKind::Login)
                .with_message("Login successful")
                .with_toast(true),
        );
        dispatcher.dispatch(
            &OperationEvent::error(OperationKind::Login)
                .with_message("Login failed")
                .with_toast(true),
        );
        dispatcher.dispatch(
            &OperationEvent::completed(OperationKind::GetUsers).with_message("quiet"),
        );
        dispatcher.dispatch(
            &OperationEvent::in_progress(OperationKind::Login)
                .with_message("ignored")
                .with_toast(true),
        );

        assert_eq!(
            *toasts.shown.lock(),
            vec![
                (true, "Login successful".to_string()),
                (false, "Login failed".to_string()),
            ]
        );
    }

    #[test]
    fn handlers_are_routed_by_kind_and_phase() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let any_phase = calls.clone();
        let only_error = calls.clone();
        let hub = EventHub::new();
        let _sub = EventDispatcher::new(Arc::new(LogToastSink))
            .on_kind(OperationKind::DeleteUser, move |e| {
                any_phase.lock().push(format!("kind:{:?}", e.phase));
            })
            .on(OperationKind::DeleteUser, EventPhase::Error, move |e| {
                only_error.lock().push(format!("error:{}", e.target_id.as_deref().unwrap_or("")));
            })
            .attach(&hub);

        hub.send_event(
            OperationEvent::in_progress(OperationKind::DeleteUser).with_target(Some("7".into())),
        );
        hub.send_event(OperationEvent::error(OperationKind::DeleteUser).with_target(Some("7".into())));
        hub.send_event(OperationEvent::completed(OperationKind::GetUser));

        assert_eq!(
            *calls.lock(),
            vec!["kind:InProgress", "error:7", "kind:Error"]
        );
    }
}
