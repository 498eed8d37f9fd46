use std::sync::{Arc, Mutex};

use crate::constants::{STATE_LOCK_ERR, WARN_EMPTY_CODE, WARN_NO_PROBLEM};
use crate::core::cases::TestCaseStore;
use crate::core::context::WorkbenchContext;
use crate::core::domain::{
    Language, Problem, RunOutcome, RunRequest, SubmissionOutcome, SubmissionStatus, SubmitRequest,
};
use crate::core::drafts::DraftStore;
use crate::core::events::WorkbenchEvent;
use crate::core::timer::AttemptTimer;
use crate::core::traits::execution::{ExecutionBackend, RunBackendError};
use crate::core::traits::format::Formatter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionState {
    #[default]
    Idle,
    Running,
    Submitting,
}

/// Mutual exclusion between the Run and Submit paths. The only state shared
/// between them; checked before any side effect and released on every exit
/// path of an attempt.
#[derive(Debug, Default)]
pub struct ExecutionLock {
    state: Mutex<ExecutionState>,
}

impl ExecutionLock {
    pub fn try_begin_run(&self) -> bool {
        self.try_transition(ExecutionState::Running)
    }

    pub fn try_begin_submit(&self) -> bool {
        self.try_transition(ExecutionState::Submitting)
    }

    fn try_transition(&self, to: ExecutionState) -> bool {
        let mut state = self.state.lock().expect(STATE_LOCK_ERR);
        if *state == ExecutionState::Idle {
            *state = to;
            true
        } else {
            false
        }
    }

    pub fn release(&self) {
        *self.state.lock().expect(STATE_LOCK_ERR) = ExecutionState::Idle;
    }

    pub fn current(&self) -> ExecutionState {
        *self.state.lock().expect(STATE_LOCK_ERR)
    }
}

/// Drives the full lifecycle of Run and Submit and the workbench flows that
/// cut across editor, drafts, cases and timer. Publishes every outcome on
/// the shared result channel; holds no display state of its own.
#[derive(Debug)]
pub struct Orchestrator {
    ctx: Arc<WorkbenchContext>,
    cases: Arc<TestCaseStore>,
    drafts: Arc<DraftStore>,
    timer: Arc<AttemptTimer>,
    execution: Arc<dyn ExecutionBackend>,
    formatter: Arc<dyn Formatter>,
    fallback_formatter: Option<Arc<dyn Formatter>>,
    lock: ExecutionLock,
}

impl Orchestrator {
    pub fn new(
        ctx: Arc<WorkbenchContext>,
        cases: Arc<TestCaseStore>,
        drafts: Arc<DraftStore>,
        timer: Arc<AttemptTimer>,
        execution: Arc<dyn ExecutionBackend>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            ctx,
            cases,
            drafts,
            timer,
            execution,
            formatter,
            fallback_formatter: None,
            lock: ExecutionLock::default(),
        }
    }

    /// Best-effort local formatter used when the format backend fails.
    pub fn with_fallback_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.fallback_formatter = Some(formatter);
        self
    }

    pub fn state(&self) -> ExecutionState {
        self.lock.current()
    }

    /// Host entry point for editor changes: updates the buffer and schedules
    /// a debounced draft save.
    pub fn edit_code(&self, code: &str) {
        self.ctx.set_code(code);
        if let Some(problem_id) = self.ctx.problem_id() {
            self.drafts.save(problem_id, self.ctx.language(), code);
        }
    }

    /// Installs a problem: sample cases into the store, draft-or-starter
    /// code into the editor, timer restarted for a fresh attempt.
    #[tracing::instrument(skip(self, problem), fields(problem_id = %problem.id))]
    pub async fn load_problem(&self, problem: Problem) {
        self.cases.initialize_from_problem(&problem.sample_cases);

        let language = self.ctx.language();
        let code = match self.drafts.load(problem.id, language).await {
            Some(draft) => draft.code,
            None => problem.starter_for(language),
        };

        self.ctx.set_problem(problem);
        self.ctx.set_code(&code);
        self.timer.reset();
        self.timer.start();
    }

    /// Re-resolves the editor buffer for the new language so a loaded draft
    /// always matches the selected language.
    pub async fn switch_language(&self, language: Language) {
        self.ctx.set_language(language);
        let Some(problem) = self.ctx.problem() else {
            return;
        };
        let code = match self.drafts.load(problem.id, language).await {
            Some(draft) => draft.code,
            None => problem.starter_for(language),
        };
        self.ctx.set_code(&code);
    }

    /// Deletes the draft, then reapplies starter code. The delete settles
    /// first so a stale draft cannot resurrect on the next load.
    #[tracing::instrument(skip(self))]
    pub async fn reset_code(&self) {
        let Some(problem) = self.ctx.problem() else {
            return;
        };
        if let Err(err) = self.drafts.clear(problem.id).await {
            tracing::warn!(error = %err, "draft delete failed during reset");
        }
        self.ctx.set_code(&problem.starter_for(self.ctx.language()));
        self.timer.reset();
        self.timer.start();
    }

    /// Formats the buffer through the backend; falls back to the local
    /// formatter when configured, else leaves the code unchanged.
    pub async fn format_code(&self) {
        let code = self.ctx.code();
        if code.trim().is_empty() {
            return;
        }
        let language = self.ctx.language();
        match self.formatter.format(&code, language).await {
            Ok(formatted) => self.ctx.set_code(&formatted),
            Err(err) => {
                tracing::warn!(error = %err, "format backend failed");
                if let Some(local) = &self.fallback_formatter {
                    if let Ok(formatted) = local.format(&code, language).await {
                        self.ctx.set_code(&formatted);
                    }
                }
            }
        }
    }

    /// Pulls the learner's last graded submission back into the editor.
    pub async fn load_last_submission(&self) {
        let Some(problem_id) = self.ctx.problem_id() else {
            return;
        };
        match self.execution.last_submission(problem_id).await {
            Ok(Some(submission)) => {
                self.ctx.set_language(submission.language);
                self.ctx.set_code(&submission.code);
            }
            Ok(None) => tracing::debug!(%problem_id, "no previous submission"),
            Err(err) => tracing::warn!(error = %err, "failed to fetch last submission"),
        }
    }

    /// Executes the buffer against the learner's custom cases. Silently
    /// ignored while a run or submission is already in flight.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) {
        let code = self.ctx.code();
        if code.trim().is_empty() {
            self.ctx.bus().publish(WorkbenchEvent::WarningRaised {
                message: WARN_EMPTY_CODE.to_string(),
            });
            return;
        }
        let Some(problem_id) = self.ctx.problem_id() else {
            tracing::debug!("run ignored: no problem loaded");
            return;
        };
        if !self.lock.try_begin_run() {
            tracing::debug!(state = ?self.lock.current(), "run ignored: executor busy");
            return;
        }

        self.ctx.bus().publish(WorkbenchEvent::RunStarted);

        let request = RunRequest {
            code,
            language: self.ctx.language(),
            custom_cases: self.cases.cases_for_run(),
        };
        let outcome = match self.execution.run(problem_id, &request).await {
            Ok(report) => RunOutcome::Report(report),
            Err(RunBackendError::Compilation { message }) => {
                RunOutcome::CompilationError { message }
            }
            Err(err) => {
                tracing::error!(error = %err, "run attempt failed");
                RunOutcome::ExecutionError {
                    message: err.to_string(),
                }
            }
        };

        // Outcome strictly before the lock release, whatever the outcome was.
        self.ctx.bus().publish(WorkbenchEvent::RunFinished(outcome));
        self.lock.release();
    }

    /// Submits the buffer for full grading. Freezes the timer on entry and
    /// carries the elapsed seconds in the submission metadata. Silently
    /// ignored while a run or submission is already in flight.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self) {
        let code = self.ctx.code();
        if code.trim().is_empty() {
            self.ctx.bus().publish(WorkbenchEvent::WarningRaised {
                message: WARN_EMPTY_CODE.to_string(),
            });
            return;
        }
        let Some(problem_id) = self.ctx.problem_id() else {
            self.ctx.bus().publish(WorkbenchEvent::WarningRaised {
                message: WARN_NO_PROBLEM.to_string(),
            });
            return;
        };
        if !self.lock.try_begin_submit() {
            tracing::debug!(state = ?self.lock.current(), "submit ignored: executor busy");
            return;
        }

        self.timer.stop();
        let time_taken_seconds = self.timer.elapsed_seconds();

        let request = SubmitRequest {
            code,
            language: self.ctx.language(),
            time_taken_seconds,
        };
        let (label, outcome) = match self.execution.submit(problem_id, &request).await {
            Ok(report) => (
                report.status.label().to_string(),
                SubmissionOutcome::from_report(report, time_taken_seconds),
            ),
            Err(err) => {
                tracing::error!(error = %err, "submission failed");
                (
                    SubmissionStatus::Error.label().to_string(),
                    SubmissionOutcome::failed(err.to_string(), time_taken_seconds),
                )
            }
        };

        self.ctx
            .bus()
            .publish(WorkbenchEvent::SubmissionReady { label, outcome });
        self.lock.release();
    }
}
