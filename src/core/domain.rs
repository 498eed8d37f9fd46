use std::collections::HashMap;

use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    GnuCpp,
    Java,
    JavaScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::GnuCpp => "cpp",
            Language::Java => "java",
            Language::JavaScript => "javascript",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python 3",
            Language::GnuCpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub starter_code: HashMap<Language, String>,
    pub sample_cases: Vec<SampleCase>,
}

impl Problem {
    pub fn starter_for(&self, language: Language) -> String {
        self.starter_code.get(&language).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct SampleCase {
    pub input: String,
    pub expected_output: String,
    pub explanation: Option<String>,
}

/// One draft per (problem, language) pair.
#[derive(Clone, Debug)]
pub struct Draft {
    pub problem_id: Uuid,
    pub language: Language,
    pub code: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftPayload {
    pub code: String,
    pub language: Language,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    pub id: Uuid,
    pub input: String,
    pub expected_output: String,
    pub is_custom: bool,
    pub explanation: Option<String>,
}

/// Input/expected pair as sent to the run endpoint. Sample cases are judged
/// server-side by problem identity and are never resent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasePayload {
    pub input: String,
    pub expected_output: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRequest {
    pub code: String,
    pub language: Language,
    pub custom_cases: Vec<CasePayload>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub code: String,
    pub language: Language,
    pub time_taken_seconds: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    WrongAnswer,
    RuntimeError,
    TimeLimitExceeded,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::WrongAnswer => "wrong_answer",
            CaseStatus::RuntimeError => "runtime_error",
            CaseStatus::TimeLimitExceeded => "time_limit_exceeded",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CaseResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub status: CaseStatus,
    pub time_ms: u64,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub passed_count: usize,
    pub total_count: usize,
    pub all_passed: bool,
    pub time_ms: u64,
    pub memory_bytes: u64,
}

/// What the run endpoint returns on a successful round trip.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub per_case: Vec<CaseResult>,
    pub summary: RunSummary,
}

/// Outcome of one Run invocation. Transient; lives only until the next run
/// clears it from the displays.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    Report(RunReport),
    CompilationError { message: String },
    ExecutionError { message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    Accepted,
    WrongAnswer,
    CompileError,
    RuntimeError,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::WrongAnswer => "wrong_answer",
            SubmissionStatus::CompileError => "compile_error",
            SubmissionStatus::RuntimeError => "runtime_error",
            SubmissionStatus::Error => "error",
        }
    }

    /// Short label shown on the temporary result tab.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Accepted => "Accepted",
            SubmissionStatus::WrongAnswer => "Wrong Answer",
            SubmissionStatus::CompileError => "Compilation Error",
            SubmissionStatus::RuntimeError => "Runtime Error",
            SubmissionStatus::Error => "Error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TestDetail {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
}

/// What the submit endpoint returns. The orchestrator folds in the elapsed
/// attempt time to produce a [`SubmissionOutcome`].
#[derive(Clone, Debug)]
pub struct SubmissionReport {
    pub status: SubmissionStatus,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
    pub execution_time_ms: u64,
    pub memory_bytes: u64,
    pub test_details: Vec<TestDetail>,
}

#[derive(Clone, Debug)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
    pub execution_time_ms: u64,
    pub memory_bytes: u64,
    pub test_details: Vec<TestDetail>,
    pub time_taken_seconds: u64,
    pub error_message: Option<String>,
}

impl SubmissionOutcome {
    pub fn from_report(report: SubmissionReport, time_taken_seconds: u64) -> Self {
        Self {
            status: report.status,
            test_cases_passed: report.test_cases_passed,
            total_test_cases: report.total_test_cases,
            execution_time_ms: report.execution_time_ms,
            memory_bytes: report.memory_bytes,
            test_details: report.test_details,
            time_taken_seconds,
            error_message: None,
        }
    }

    /// Synthetic outcome for a submit attempt that never produced a grading
    /// report (transport failure, malformed response).
    pub fn failed(message: String, time_taken_seconds: u64) -> Self {
        Self {
            status: SubmissionStatus::Error,
            test_cases_passed: 0,
            total_test_cases: 0,
            execution_time_ms: 0,
            memory_bytes: 0,
            test_details: Vec::new(),
            time_taken_seconds,
            error_message: Some(message),
        }
    }
}

/// Code and language of the learner's most recent graded submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSubmission {
    pub code: String,
    pub language: Language,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerState {
    pub elapsed_seconds: u64,
    pub is_running: bool,
}
