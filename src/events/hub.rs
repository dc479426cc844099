use crate::types::OperationEvent;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::trace;

pub type Listener = Arc<dyn Fn(&OperationEvent) + Send + Sync>;

#[derive(Default)]
struct HubState {
    current: Option<OperationEvent>,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Single-slot broadcaster for operation events.
///
/// Delivery is synchronous on the sender's task, in subscription order. Only
/// the latest event is kept; late subscribers never see earlier events.
#[derive(Clone, Default)]
pub struct EventHub {
    state: Arc<Mutex<HubState>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_event(&self, event: OperationEvent) {
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = {
            let mut state = self.state.lock();
            state.current = Some(event.clone());
            state.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        trace!(
            kind = event.kind.as_str(),
            phase = ?event.phase,
            listeners = listeners.len(),
            "Broadcasting operation event"
        );
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OperationEvent) + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Arc::new(callback)));
        Subscription {
            hub: Arc::downgrade(&self.state),
            id,
        }
    }

    pub fn clear_event(&self) {
        self.state.lock().current = None;
    }

    pub fn current_event(&self) -> Option<OperationEvent> {
        self.state.lock().current.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

/// Handle to one registration. Dropping it leaves the listener registered.
pub struct Subscription {
    hub: Weak<Mutex<HubState>>,
    id: u64,
}

impl Subscription {
    /// Removes this registration. Repeated calls are no-ops.
    pub fn unsubscribe(&self) {
        if let Some(state) = self.hub.upgrade() {
            state.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
