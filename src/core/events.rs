use tokio::sync::broadcast;

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::core::domain::{RunOutcome, SubmissionOutcome};

/// Everything the orchestration layer broadcasts to its display regions.
/// Within one Run/Submit attempt the started variant is always published
/// strictly before the outcome variant.
#[derive(Clone, Debug)]
pub enum WorkbenchEvent {
    RunStarted,
    RunFinished(RunOutcome),
    SubmissionReady {
        label: String,
        outcome: SubmissionOutcome,
    },
    SubmissionOverlayClosed,
    DraftSave(DraftSaveStatus),
    WarningRaised {
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftSaveStatus {
    Saving,
    Saved,
    Failed { message: String },
}

/// Fan-out broadcast channel connecting the orchestrator to any number of
/// independent subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<WorkbenchEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: WorkbenchEvent) {
        tracing::debug!(?event, "publish");
        if self.sender.send(event).is_err() {
            // A send only fails when no subscriber is attached.
            tracing::trace!("no active subscribers on the result channel");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkbenchEvent> {
        self.sender.subscribe()
    }
}
