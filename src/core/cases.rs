use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

use crate::constants::CASES_LOCK_ERR;
use crate::core::domain::{CasePayload, RunOutcome, SampleCase, TestCase};
use crate::core::events::{EventBus, WorkbenchEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseField {
    Input,
    ExpectedOutput,
}

#[derive(Debug, Default)]
struct CaseList {
    cases: Vec<TestCase>,
    active: usize,
    editing: bool,
    last_run: Option<RunOutcome>,
}

/// Source of truth for sample and user-authored test cases, the active-case
/// selection, and the per-case display state refreshed from the result
/// channel.
#[derive(Debug, Default)]
pub struct TestCaseStore {
    inner: Mutex<CaseList>,
}

impl TestCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all state with the problem's sample cases.
    pub fn initialize_from_problem(&self, sample_cases: &[SampleCase]) {
        let mut inner = self.inner.lock().expect(CASES_LOCK_ERR);
        inner.cases = sample_cases
            .iter()
            .map(|sample| TestCase {
                id: Uuid::new_v4(),
                input: sample.input.clone(),
                expected_output: sample.expected_output.clone(),
                is_custom: false,
                explanation: sample.explanation.clone(),
            })
            .collect();
        inner.active = 0;
        inner.editing = false;
        inner.last_run = None;
    }

    /// Appends a custom case cloned from the first existing case, makes it
    /// active and opens it for editing.
    pub fn add_custom(&self) -> Uuid {
        let mut inner = self.inner.lock().expect(CASES_LOCK_ERR);
        let (input, expected_output) = inner
            .cases
            .first()
            .map(|first| (first.input.clone(), first.expected_output.clone()))
            .unwrap_or_default();

        let case = TestCase {
            id: Uuid::new_v4(),
            input,
            expected_output,
            is_custom: true,
            explanation: None,
        };
        let id = case.id;
        inner.cases.push(case);
        inner.active = inner.cases.len() - 1;
        inner.editing = true;
        id
    }

    /// Deletes a custom case. Sample cases are immutable; the active index
    /// stays valid afterwards.
    pub fn remove_custom(&self, id: Uuid) -> bool {
        let mut inner = self.inner.lock().expect(CASES_LOCK_ERR);
        let Some(index) = inner.cases.iter().position(|case| case.id == id) else {
            return false;
        };
        if !inner.cases[index].is_custom {
            tracing::debug!(%id, "refusing to remove sample case");
            return false;
        }

        inner.cases.remove(index);
        if index < inner.active {
            inner.active -= 1;
        }
        if inner.active >= inner.cases.len() {
            inner.active = inner.cases.len().saturating_sub(1);
        }
        true
    }

    /// Mutates a field of a custom case; no-op on samples.
    pub fn update(&self, id: Uuid, field: CaseField, value: &str) {
        let mut inner = self.inner.lock().expect(CASES_LOCK_ERR);
        let Some(case) = inner
            .cases
            .iter_mut()
            .find(|case| case.id == id && case.is_custom)
        else {
            tracing::debug!(%id, "update ignored: not an editable case");
            return;
        };
        match field {
            CaseField::Input => case.input = value.to_string(),
            CaseField::ExpectedOutput => case.expected_output = value.to_string(),
        }
    }

    /// The subset sent along with a Run: custom cases only.
    pub fn cases_for_run(&self) -> Vec<CasePayload> {
        self.inner
            .lock()
            .expect(CASES_LOCK_ERR)
            .cases
            .iter()
            .filter(|case| case.is_custom)
            .map(|case| CasePayload {
                input: case.input.clone(),
                expected_output: case.expected_output.clone(),
            })
            .collect()
    }

    pub fn select(&self, index: usize) {
        let mut inner = self.inner.lock().expect(CASES_LOCK_ERR);
        if index < inner.cases.len() {
            inner.active = index;
            inner.editing = false;
        }
    }

    pub fn active_case(&self) -> Option<TestCase> {
        let inner = self.inner.lock().expect(CASES_LOCK_ERR);
        inner.cases.get(inner.active).cloned()
    }

    pub fn active_index(&self) -> usize {
        self.inner.lock().expect(CASES_LOCK_ERR).active
    }

    pub fn is_editing(&self) -> bool {
        self.inner.lock().expect(CASES_LOCK_ERR).editing
    }

    pub fn cases(&self) -> Vec<TestCase> {
        self.inner.lock().expect(CASES_LOCK_ERR).cases.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect(CASES_LOCK_ERR).cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last run outcome as shown in the per-case panel, if any run has
    /// finished since the panel was last cleared.
    pub fn last_run(&self) -> Option<RunOutcome> {
        self.inner.lock().expect(CASES_LOCK_ERR).last_run.clone()
    }

    pub fn apply_event(&self, event: &WorkbenchEvent) {
        match event {
            WorkbenchEvent::RunStarted => {
                self.inner.lock().expect(CASES_LOCK_ERR).last_run = None;
            }
            WorkbenchEvent::RunFinished(outcome) => {
                self.inner.lock().expect(CASES_LOCK_ERR).last_run = Some(outcome.clone());
            }
            _ => {}
        }
    }

    /// Spawns the subscriber pump that keeps the per-case display in sync
    /// with the result channel.
    pub fn attach(self: Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let store = self;
        let mut events = BroadcastStream::new(bus.subscribe());
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) => store.apply_event(&event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "case panel lagged behind the result channel");
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{CaseResult, CaseStatus, RunReport, RunSummary};

    fn sample(input: &str, expected: &str) -> SampleCase {
        SampleCase {
            input: input.to_string(),
            expected_output: expected.to_string(),
            explanation: None,
        }
    }

    fn store_with_samples() -> TestCaseStore {
        let store = TestCaseStore::new();
        store.initialize_from_problem(&[sample("1 2", "3"), sample("4 5", "9")]);
        store
    }

    #[test]
    fn test_initialize_replaces_state_and_resets_selection() {
        let store = store_with_samples();
        store.add_custom();
        store.select(2);

        store.initialize_from_problem(&[SampleCase {
            input: "7".to_string(),
            expected_output: "7".to_string(),
            explanation: Some("identity".to_string()),
        }]);

        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_index(), 0);
        assert!(!store.cases()[0].is_custom);
        assert_eq!(store.cases()[0].explanation.as_deref(), Some("identity"));
        assert!(store.last_run().is_none());
    }

    #[test]
    fn test_add_custom_clones_first_case_and_becomes_active() {
        let store = store_with_samples();
        let id = store.add_custom();

        let active = store.active_case().unwrap();
        assert_eq!(active.id, id);
        assert!(active.is_custom);
        assert_eq!(active.input, "1 2");
        assert_eq!(active.expected_output, "3");
        assert_eq!(store.active_index(), 2);
        assert!(store.is_editing());
    }

    #[test]
    fn test_remove_refuses_sample_cases() {
        let store = store_with_samples();
        let sample_id = store.cases()[0].id;

        assert!(!store.remove_custom(sample_id));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_active_last_case_clamps_index() {
        let store = store_with_samples();
        let id = store.add_custom();
        assert_eq!(store.active_index(), 2);

        assert!(store.remove_custom(id));
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_index(), 1);
    }

    #[test]
    fn test_remove_before_active_shifts_index_down() {
        let store = store_with_samples();
        let first_custom = store.add_custom();
        store.add_custom();
        assert_eq!(store.active_index(), 3);

        assert!(store.remove_custom(first_custom));
        // Still pointing at the same (last) custom case.
        assert_eq!(store.active_index(), 2);
        assert!(store.active_case().unwrap().is_custom);
    }

    #[test]
    fn test_update_touches_custom_cases_only() {
        let store = store_with_samples();
        let sample_id = store.cases()[0].id;
        let custom_id = store.add_custom();

        store.update(sample_id, CaseField::Input, "overwritten");
        store.update(custom_id, CaseField::Input, "5\n3");
        store.update(custom_id, CaseField::ExpectedOutput, "8");

        assert_eq!(store.cases()[0].input, "1 2");
        let custom = store.active_case().unwrap();
        assert_eq!(custom.input, "5\n3");
        assert_eq!(custom.expected_output, "8");
    }

    #[test]
    fn test_cases_for_run_excludes_samples() {
        let store = store_with_samples();
        let custom_id = store.add_custom();
        store.update(custom_id, CaseField::Input, "5\n3");
        store.update(custom_id, CaseField::ExpectedOutput, "8");

        let payload = store.cases_for_run();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].input, "5\n3");
        assert_eq!(payload[0].expected_output, "8");
    }

    #[test]
    fn test_run_events_drive_the_display_state() {
        let store = store_with_samples();

        let outcome = RunOutcome::Report(RunReport {
            per_case: vec![CaseResult {
                input: "1 2".to_string(),
                expected_output: "3".to_string(),
                actual_output: "4".to_string(),
                passed: false,
                status: CaseStatus::WrongAnswer,
                time_ms: 9,
                error_message: None,
            }],
            summary: RunSummary {
                passed_count: 0,
                total_count: 1,
                all_passed: false,
                time_ms: 9,
                memory_bytes: 1024,
            },
        });
        store.apply_event(&WorkbenchEvent::RunFinished(outcome));

        let Some(RunOutcome::Report(shown)) = store.last_run() else {
            panic!("Expected a run report on display");
        };
        let case = &shown.per_case[0];
        assert_eq!(case.expected_output, "3");
        assert_eq!(case.actual_output, "4");
        assert!(!case.passed);
        assert!(case.error_message.is_none());
        assert_eq!(shown.summary.passed_count, 0);
        assert_eq!(shown.summary.total_count, 1);
        assert_eq!(shown.summary.time_ms, 9);
        assert_eq!(shown.summary.memory_bytes, 1024);

        store.apply_event(&WorkbenchEvent::RunStarted);
        assert!(store.last_run().is_none());
    }

    #[tokio::test]
    async fn test_attach_pumps_events_from_the_bus() {
        let store = Arc::new(store_with_samples());
        let bus = EventBus::new();
        let _pump = Arc::clone(&store).attach(&bus);

        bus.publish(WorkbenchEvent::RunFinished(RunOutcome::ExecutionError {
            message: "judge unavailable".to_string(),
        }));

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            store.last_run(),
            Some(RunOutcome::ExecutionError { .. })
        ));
    }
}
