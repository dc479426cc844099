use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

struct LoadingInner {
    count: Mutex<usize>,
    busy: watch::Sender<bool>,
}

/// Counts in-flight API requests. `is_busy()` is true iff the count is
/// positive; the count never drops below zero.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<LoadingInner>,
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingTracker {
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoadingInner {
                count: Mutex::new(0),
                busy,
            }),
        }
    }

    pub fn increment(&self) {
        let mut count = self.inner.count.lock();
        *count += 1;
        self.publish(*count);
    }

    /// Counts one request until the returned guard is dropped, including when
    /// the request future is cancelled mid-flight.
    pub fn begin(&self) -> InFlight {
        self.increment();
        InFlight {
            tracker: self.clone(),
        }
    }

    pub fn decrement(&self) {
        let mut count = self.inner.count.lock();
        *count = count.saturating_sub(1);
        self.publish(*count);
    }

    fn publish(&self, count: usize) {
        self.inner.busy.send_if_modified(|busy| {
            let next = count > 0;
            let changed = *busy != next;
            *busy = next;
            changed
        });
    }

    pub fn count(&self) -> usize {
        *self.inner.count.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Receiver that observes busy-flag transitions.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }
}

/// One counted request; decrements the tracker on drop.
#[must_use = "the request stops being counted as soon as this is dropped"]
pub struct InFlight {
    tracker: LoadingTracker,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}
