use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::constants::DRAFT_QUIET_PERIOD;
use crate::core::debounce::Debouncer;
use crate::core::domain::{Draft, DraftPayload, Language};
use crate::core::events::{DraftSaveStatus, EventBus, WorkbenchEvent};
use crate::core::traits::TransportError;
use crate::core::traits::drafts::DraftBackend;

/// Durable, low-churn persistence of work-in-progress code. Writes are
/// coalesced: of all `save` calls inside one quiet period only the last
/// one's code reaches the backend.
#[derive(Debug)]
pub struct DraftStore {
    backend: Arc<dyn DraftBackend>,
    bus: EventBus,
    debouncer: Debouncer,
}

impl DraftStore {
    pub fn new(backend: Arc<dyn DraftBackend>, bus: EventBus) -> Self {
        Self::with_quiet_period(backend, bus, DRAFT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        backend: Arc<dyn DraftBackend>,
        bus: EventBus,
        quiet_period: Duration,
    ) -> Self {
        Self {
            backend,
            bus,
            debouncer: Debouncer::new(quiet_period),
        }
    }

    /// Schedules a debounced write. Returns immediately; the editor is never
    /// blocked on persistence. Empty code is not worth a draft.
    pub fn save(&self, problem_id: Uuid, language: Language, code: &str) {
        if code.trim().is_empty() {
            tracing::debug!(%problem_id, "skipping draft save of empty code");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let bus = self.bus.clone();
        let payload = DraftPayload {
            code: code.to_string(),
            language,
        };

        self.debouncer.schedule(async move {
            bus.publish(WorkbenchEvent::DraftSave(DraftSaveStatus::Saving));
            match backend.save(problem_id, &payload).await {
                Ok(()) => {
                    tracing::debug!(%problem_id, language = language.as_str(), "draft saved");
                    bus.publish(WorkbenchEvent::DraftSave(DraftSaveStatus::Saved));
                }
                Err(err) => {
                    // The in-memory buffer still holds the code; the next
                    // edit schedules another attempt.
                    tracing::warn!(%problem_id, error = %err, "draft save failed");
                    bus.publish(WorkbenchEvent::DraftSave(DraftSaveStatus::Failed {
                        message: err.to_string(),
                    }));
                }
            }
        });
    }

    /// Most recent draft for the pair, or `None` (missing draft and backend
    /// failure both fall back to starter code at the caller).
    pub async fn load(&self, problem_id: Uuid, language: Language) -> Option<Draft> {
        match self.backend.load(problem_id, language).await {
            Ok(draft) => draft,
            Err(err) => {
                tracing::warn!(%problem_id, error = %err, "draft load failed");
                None
            }
        }
    }

    /// Drops any pending write, then deletes the persisted draft. Must settle
    /// before starter code is reapplied so a stale draft cannot resurrect on
    /// the next load.
    pub async fn clear(&self, problem_id: Uuid) -> Result<(), TransportError> {
        self.debouncer.cancel();
        self.backend.delete(problem_id).await
    }
}
