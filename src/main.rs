use std::collections::HashMap;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::core::cases::{CaseField, TestCaseStore};
use crate::core::context::WorkbenchContext;
use crate::core::domain::{
    CaseResult, CaseStatus, Language, Problem, RunOutcome, RunReport, RunSummary, SampleCase,
    SubmissionReport, SubmissionStatus, TestDetail,
};
use crate::core::drafts::DraftStore;
use crate::core::events::EventBus;
use crate::core::orchestrator::Orchestrator;
use crate::core::results::ResultTabs;
use crate::core::timer::AttemptTimer;
use crate::native::format::TidyFormatter;
use crate::stubs::drafts::InMemoryDraftBackend;
use crate::stubs::execution::ExecutionStub;
use crate::stubs::format::FormatterStub;

mod constants;
mod core;
mod native;
mod stubs;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    let ctx = Arc::new(WorkbenchContext::new());
    let cases = Arc::new(TestCaseStore::new());
    let timer = Arc::new(AttemptTimer::new());
    let drafts = Arc::new(DraftStore::new(
        Arc::new(InMemoryDraftBackend::new()),
        ctx.bus().clone(),
    ));

    let execution = Arc::new(ExecutionStub::new(
        Ok(demo_run_report()),
        Ok(demo_submission_report()),
        Duration::from_millis(300),
    ));
    let formatter = Arc::new(FormatterStub::new(
        Ok("print(sum(map(int, input().split())))\n".to_string()),
        Duration::from_millis(100),
    ));

    let orchestrator = Orchestrator::new(
        Arc::clone(&ctx),
        Arc::clone(&cases),
        Arc::clone(&drafts),
        Arc::clone(&timer),
        execution,
        formatter,
    )
    .with_fallback_formatter(Arc::new(TidyFormatter::new()));

    let tabs = Arc::new(ResultTabs::new(
        vec![
            "Description".to_string(),
            "Solutions".to_string(),
            "Submissions".to_string(),
        ],
        ctx.bus().clone(),
    ));
    Arc::clone(&tabs).attach();
    Arc::clone(&cases).attach(ctx.bus());
    spawn_event_logger(ctx.bus());

    orchestrator.load_problem(demo_problem()).await;
    tracing::info!(
        problem = %ctx.problem().map(|p| p.title).unwrap_or_default(),
        language = ctx.language().display_name(),
        tabs = ?tabs.permanent_tabs(),
        "workbench ready"
    );

    // A short attempt: a few edits (coalesced into one draft write), a run
    // against a custom case, then a graded submission.
    orchestrator.edit_code("print()");
    orchestrator.edit_code("print(sum())");
    orchestrator.edit_code("print(sum(map(int, input().split())))");

    let custom = cases.add_custom();
    cases.update(custom, CaseField::Input, "5 3");
    cases.update(custom, CaseField::ExpectedOutput, "8");

    orchestrator.run().await;
    orchestrator.submit().await;

    // Let the debounced draft write and the subscriber pumps settle.
    tokio::time::sleep(Duration::from_secs(3)).await;

    if let Some(RunOutcome::Report(report)) = cases.last_run() {
        for case in &report.per_case {
            tracing::info!(
                input = %case.input,
                status = case.status.as_str(),
                time_ms = case.time_ms,
                "run case"
            );
        }
    }
    if let Some(tab) = tabs.result_tab() {
        tracing::info!(
            label = %tab.label,
            status = tab.outcome.status.as_str(),
            passed = tab.outcome.test_cases_passed,
            total = tab.outcome.total_test_cases,
            time_taken_seconds = tab.outcome.time_taken_seconds,
            "submission result"
        );
    }
    tracing::info!(elapsed = timer.elapsed_seconds(), "attempt finished");
}

fn spawn_event_logger(bus: &EventBus) {
    let mut events = BroadcastStream::new(bus.subscribe());
    tokio::spawn(async move {
        while let Some(Ok(event)) = events.next().await {
            tracing::info!(?event, "workbench event");
        }
    });
}

fn demo_problem() -> Problem {
    Problem {
        id: Uuid::new_v4(),
        title: "Sum of Two Numbers".to_string(),
        starter_code: HashMap::from([
            (
                Language::Python,
                "# read two numbers, print their sum\n".to_string(),
            ),
            (
                Language::GnuCpp,
                "#include <iostream>\n\nint main() {}\n".to_string(),
            ),
        ]),
        sample_cases: vec![
            SampleCase {
                input: "2 7".to_string(),
                expected_output: "9".to_string(),
                explanation: Some("2 + 7 == 9".to_string()),
            },
            SampleCase {
                input: "0 0".to_string(),
                expected_output: "0".to_string(),
                explanation: None,
            },
        ],
    }
}

fn demo_run_report() -> RunReport {
    RunReport {
        per_case: vec![CaseResult {
            input: "5 3".to_string(),
            expected_output: "8".to_string(),
            actual_output: "8".to_string(),
            passed: true,
            status: CaseStatus::Passed,
            time_ms: 11,
            error_message: None,
        }],
        summary: RunSummary {
            passed_count: 1,
            total_count: 1,
            all_passed: true,
            time_ms: 11,
            memory_bytes: 7 * 1024 * 1024,
        },
    }
}

fn demo_submission_report() -> SubmissionReport {
    SubmissionReport {
        status: SubmissionStatus::Accepted,
        test_cases_passed: 25,
        total_test_cases: 25,
        execution_time_ms: 40,
        memory_bytes: 12 * 1024 * 1024,
        test_details: vec![TestDetail {
            input: "2 7".to_string(),
            expected_output: "9".to_string(),
            actual_output: "9".to_string(),
            passed: true,
        }],
    }
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
