use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::constants::TABS_LOCK_ERR;
use crate::core::domain::SubmissionOutcome;
use crate::core::events::{EventBus, WorkbenchEvent};

/// The single ephemeral result tab a submission produces.
#[derive(Clone, Debug)]
pub struct ResultTab {
    pub label: String,
    pub outcome: SubmissionOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveView {
    Permanent(usize),
    Result,
}

#[derive(Debug)]
struct TabsState {
    active_permanent: usize,
    showing_result: bool,
    temporary: Option<ResultTab>,
    overlay_active: bool,
}

/// Turns submission outcomes into a transient, closable result view layered
/// over the workbench's permanent tabs. At most one temporary tab exists at
/// a time; a new submission replaces it.
#[derive(Debug)]
pub struct ResultTabs {
    permanent: Vec<String>,
    bus: EventBus,
    state: Mutex<TabsState>,
}

impl ResultTabs {
    pub fn new(permanent: Vec<String>, bus: EventBus) -> Self {
        Self {
            permanent,
            bus,
            state: Mutex::new(TabsState {
                active_permanent: 0,
                showing_result: false,
                temporary: None,
                overlay_active: false,
            }),
        }
    }

    pub fn permanent_tabs(&self) -> &[String] {
        &self.permanent
    }

    /// Creates or replaces the temporary tab and brings it to the front.
    /// The permanent content underneath is hidden, not discarded.
    pub fn open_result(&self, label: String, outcome: SubmissionOutcome) {
        let mut state = self.state.lock().expect(TABS_LOCK_ERR);
        state.temporary = Some(ResultTab { label, outcome });
        state.showing_result = true;
        state.overlay_active = true;
    }

    /// Selecting a permanent tab closes the overlay but keeps the temporary
    /// tab (and its label) around until it is explicitly closed or replaced.
    pub fn select_permanent(&self, index: usize) {
        if index >= self.permanent.len() {
            tracing::debug!(index, "ignoring selection of unknown tab");
            return;
        }
        let mut state = self.state.lock().expect(TABS_LOCK_ERR);
        state.active_permanent = index;
        state.showing_result = false;
        state.overlay_active = false;
    }

    /// Removes the temporary tab entirely and restores the previously
    /// active permanent tab.
    pub fn close_result(&self) {
        let mut state = self.state.lock().expect(TABS_LOCK_ERR);
        if state.temporary.take().is_none() {
            return;
        }
        state.showing_result = false;
        state.overlay_active = false;
        drop(state);
        self.bus.publish(WorkbenchEvent::SubmissionOverlayClosed);
    }

    pub fn active_view(&self) -> ActiveView {
        let state = self.state.lock().expect(TABS_LOCK_ERR);
        if state.showing_result && state.temporary.is_some() {
            ActiveView::Result
        } else {
            ActiveView::Permanent(state.active_permanent)
        }
    }

    pub fn result_tab(&self) -> Option<ResultTab> {
        self.state.lock().expect(TABS_LOCK_ERR).temporary.clone()
    }

    pub fn overlay_active(&self) -> bool {
        self.state.lock().expect(TABS_LOCK_ERR).overlay_active
    }

    /// Spawns the subscriber pump reacting to submission events on the
    /// result channel.
    pub fn attach(self: Arc<Self>) -> JoinHandle<()> {
        let tabs = self;
        let mut events = BroadcastStream::new(tabs.bus.subscribe());
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    Ok(WorkbenchEvent::SubmissionReady { label, outcome }) => {
                        tabs.open_result(label, outcome);
                    }
                    Ok(_) => {}
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "result view lagged behind the result channel");
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::SubmissionStatus;

    fn accepted_outcome() -> SubmissionOutcome {
        SubmissionOutcome {
            status: SubmissionStatus::Accepted,
            test_cases_passed: 10,
            total_test_cases: 10,
            execution_time_ms: 30,
            memory_bytes: 8 * 1024 * 1024,
            test_details: Vec::new(),
            time_taken_seconds: 120,
            error_message: None,
        }
    }

    fn tabs() -> ResultTabs {
        ResultTabs::new(
            vec![
                "Description".to_string(),
                "Solutions".to_string(),
                "Submissions".to_string(),
            ],
            EventBus::new(),
        )
    }

    #[test]
    fn test_submission_opens_result_tab_as_active_view() {
        let tabs = tabs();
        tabs.open_result("Accepted".to_string(), accepted_outcome());

        assert_eq!(tabs.active_view(), ActiveView::Result);
        assert!(tabs.overlay_active());
        assert_eq!(tabs.result_tab().unwrap().label, "Accepted");
    }

    #[test]
    fn test_new_submission_replaces_rather_than_appends() {
        let tabs = tabs();
        tabs.open_result("Wrong Answer".to_string(), accepted_outcome());
        tabs.open_result("Accepted".to_string(), accepted_outcome());

        assert_eq!(tabs.result_tab().unwrap().label, "Accepted");
    }

    #[test]
    fn test_permanent_selection_hides_overlay_but_keeps_tab() {
        let tabs = tabs();
        tabs.open_result("Accepted".to_string(), accepted_outcome());

        tabs.select_permanent(1);

        assert_eq!(tabs.active_view(), ActiveView::Permanent(1));
        assert!(!tabs.overlay_active());
        // The label survives until replaced or explicitly closed.
        assert_eq!(tabs.result_tab().unwrap().label, "Accepted");
    }

    #[test]
    fn test_close_removes_tab_and_restores_previous_permanent() {
        let tabs = tabs();
        tabs.select_permanent(2);
        tabs.open_result("Accepted".to_string(), accepted_outcome());
        assert_eq!(tabs.active_view(), ActiveView::Result);

        tabs.close_result();

        assert_eq!(tabs.active_view(), ActiveView::Permanent(2));
        assert!(tabs.result_tab().is_none());
        assert!(!tabs.overlay_active());
    }

    #[test]
    fn test_close_publishes_overlay_closed_once() {
        let bus = EventBus::new();
        let tabs = ResultTabs::new(vec!["Description".to_string()], bus.clone());
        let mut events = bus.subscribe();

        tabs.open_result("Accepted".to_string(), accepted_outcome());
        tabs.close_result();
        // A second close has nothing to do.
        tabs.close_result();

        assert!(matches!(
            events.try_recv().unwrap(),
            WorkbenchEvent::SubmissionOverlayClosed
        ));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_out_of_range_selection_is_ignored() {
        let tabs = tabs();
        tabs.select_permanent(1);
        tabs.select_permanent(99);

        assert_eq!(tabs.active_view(), ActiveView::Permanent(1));
    }

    #[tokio::test]
    async fn test_attach_opens_tab_from_submission_event() {
        let bus = EventBus::new();
        let tabs = Arc::new(ResultTabs::new(vec!["Description".to_string()], bus.clone()));
        let _pump = Arc::clone(&tabs).attach();

        bus.publish(WorkbenchEvent::SubmissionReady {
            label: "Accepted".to_string(),
            outcome: accepted_outcome(),
        });

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(tabs.active_view(), ActiveView::Result);
        assert_eq!(tabs.result_tab().unwrap().label, "Accepted");
    }
}
