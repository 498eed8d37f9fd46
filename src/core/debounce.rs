use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::constants::DEBOUNCE_LOCK_ERR;

/// A cancelable scheduled task: every `schedule` call aborts the previously
/// scheduled action and arms a fresh one that fires after the quiet period.
/// Only the action armed last ever runs.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: Mutex::new(None),
        }
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().expect(DEBOUNCE_LOCK_ERR);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let quiet_period = self.quiet_period;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            action.await;
        }));
    }

    /// Drops whatever is armed without running it.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().expect(DEBOUNCE_LOCK_ERR).take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
