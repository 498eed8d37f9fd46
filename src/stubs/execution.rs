use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use uuid::Uuid;

use crate::core::domain::{RunReport, RunRequest, StoredSubmission, SubmissionReport, SubmitRequest};
use crate::core::traits::TransportError;
use crate::core::traits::execution::{ExecutionBackend, RunBackendError};

/// Canned execution backend: returns fixed results after an artificial
/// delay. Counts calls so tests can assert that the mutual-exclusion paths
/// never reached the backend.
#[derive(Debug)]
pub struct ExecutionStub {
    run_result: Result<RunReport, RunBackendError>,
    submit_result: Result<SubmissionReport, TransportError>,
    last_submission: Option<StoredSubmission>,
    delay: Duration,
    run_calls: AtomicU32,
    submit_calls: AtomicU32,
}

impl ExecutionStub {
    pub fn new(
        run_result: Result<RunReport, RunBackendError>,
        submit_result: Result<SubmissionReport, TransportError>,
        delay: Duration,
    ) -> Self {
        Self {
            run_result,
            submit_result,
            last_submission: None,
            delay,
            run_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        }
    }

    pub fn with_last_submission(mut self, submission: StoredSubmission) -> Self {
        self.last_submission = Some(submission);
        self
    }

    pub fn run_calls(&self) -> u32 {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ExecutionBackend for ExecutionStub {
    #[tracing::instrument]
    async fn run(
        &self,
        problem_id: Uuid,
        request: &RunRequest,
    ) -> Result<RunReport, RunBackendError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            %problem_id,
            language = request.language.as_str(),
            bytes = request.code.len(),
            cases = request.custom_cases.len(),
            "stub run"
        );
        tokio::time::sleep(self.delay).await;
        self.run_result.clone()
    }

    #[tracing::instrument]
    async fn submit(
        &self,
        problem_id: Uuid,
        request: &SubmitRequest,
    ) -> Result<SubmissionReport, TransportError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            %problem_id,
            language = request.language.as_str(),
            bytes = request.code.len(),
            time_taken = request.time_taken_seconds,
            "stub submit"
        );
        tokio::time::sleep(self.delay).await;
        self.submit_result.clone()
    }

    async fn last_submission(
        &self,
        problem_id: Uuid,
    ) -> Result<Option<StoredSubmission>, TransportError> {
        tracing::debug!(%problem_id, "stub last_submission");
        tokio::time::sleep(self.delay).await;
        Ok(self.last_submission.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{Language, RunSummary, SubmissionStatus};

    fn empty_report() -> RunReport {
        RunReport {
            per_case: Vec::new(),
            summary: RunSummary {
                passed_count: 0,
                total_count: 0,
                all_passed: false,
                time_ms: 0,
                memory_bytes: 0,
            },
        }
    }

    fn empty_submission() -> SubmissionReport {
        SubmissionReport {
            status: SubmissionStatus::Accepted,
            test_cases_passed: 0,
            total_test_cases: 0,
            execution_time_ms: 0,
            memory_bytes: 0,
            test_details: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_calls_and_replays_canned_results() {
        let stub = ExecutionStub::new(
            Ok(empty_report()),
            Ok(empty_submission()),
            Duration::from_millis(50),
        )
        .with_last_submission(StoredSubmission {
            code: "print(1)".to_string(),
            language: Language::Python,
        });

        let problem_id = Uuid::new_v4();
        let request = RunRequest {
            code: "print(1)".to_string(),
            language: Language::Python,
            custom_cases: Vec::new(),
        };
        stub.run(problem_id, &request).await.unwrap();
        assert_eq!(stub.run_calls(), 1);
        assert_eq!(stub.submit_calls(), 0);

        let last = stub.last_submission(problem_id).await.unwrap().unwrap();
        assert_eq!(last.language, Language::Python);
    }
}
