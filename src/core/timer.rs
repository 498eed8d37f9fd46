use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::constants::TIMER_LOCK_ERR;
use crate::core::domain::TimerState;

#[derive(Debug, Default)]
struct TimerInner {
    accumulated: Duration,
    running_since: Option<Instant>,
}

/// Wall-clock elapsed attempt time with manual start/stop/reset control.
/// The orchestrator freezes it when a submission begins and reads the
/// elapsed seconds into the submission metadata.
#[derive(Debug, Default)]
pub struct AttemptTimer {
    inner: Mutex<TimerInner>,
}

impl AttemptTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: starting a running timer changes nothing.
    pub fn start(&self) {
        let mut inner = self.inner.lock().expect(TIMER_LOCK_ERR);
        if inner.running_since.is_none() {
            inner.running_since = Some(Instant::now());
        }
    }

    /// Idempotent: stopping a stopped timer changes nothing.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().expect(TIMER_LOCK_ERR);
        if let Some(started) = inner.running_since.take() {
            inner.accumulated += started.elapsed();
        }
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect(TIMER_LOCK_ERR);
        inner.accumulated = Duration::ZERO;
        inner.running_since = None;
    }

    pub fn elapsed_seconds(&self) -> u64 {
        let inner = self.inner.lock().expect(TIMER_LOCK_ERR);
        let running = inner
            .running_since
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO);
        (inner.accumulated + running).as_secs()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().expect(TIMER_LOCK_ERR).running_since.is_some()
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            elapsed_seconds: self.elapsed_seconds(),
            is_running: self.is_running(),
        }
    }
}
