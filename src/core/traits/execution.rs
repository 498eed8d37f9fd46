use uuid::Uuid;

use crate::core::domain::{RunReport, RunRequest, StoredSubmission, SubmissionReport, SubmitRequest};
use crate::core::traits::TransportError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RunBackendError {
    /// The submitted code did not compile. Carries the diagnostics so the
    /// display can show source-oriented detail.
    #[error("compilation failed: {message}")]
    Compilation { message: String },

    /// The judge rejected the run after compilation (non-zero exit, crash).
    #[error("execution failed: {message}")]
    Execution { message: String },

    #[error("{message}")]
    Transport { message: String },
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait ExecutionBackend: std::fmt::Debug + Send + Sync {
    async fn run(
        &self,
        problem_id: Uuid,
        request: &RunRequest,
    ) -> Result<RunReport, RunBackendError>;

    async fn submit(
        &self,
        problem_id: Uuid,
        request: &SubmitRequest,
    ) -> Result<SubmissionReport, TransportError>;

    async fn last_submission(
        &self,
        problem_id: Uuid,
    ) -> Result<Option<StoredSubmission>, TransportError>;
}
