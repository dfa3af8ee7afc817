use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Trailing-edge debounce: every call reschedules the action; it runs once
/// the calls stop for the configured delay. Once the delay has elapsed the
/// action is spawned on its own task and can no longer be cancelled.
#[derive(Clone)]
pub struct Debounce {
    delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tokio::spawn(action);
        }));
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

/// Leading-edge throttle: the first call runs immediately, further calls are
/// dropped until the limit window has elapsed.
#[derive(Clone)]
pub struct Throttle {
    limit: Duration,
    open_at: Arc<Mutex<Option<Instant>>>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            open_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns true when the action was accepted and spawned.
    pub fn call<F>(&self, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut open_at = self.open_at.lock().unwrap_or_else(|err| err.into_inner());
        let now = Instant::now();
        if let Some(at) = *open_at {
            if now < at {
                return false;
            }
        }
        *open_at = Some(now + self.limit);
        let _ = tokio::spawn(action);
        true
    }
}
