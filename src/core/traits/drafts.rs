use uuid::Uuid;

use crate::core::domain::{Draft, DraftPayload, Language};
use crate::core::traits::TransportError;

#[mockall::automock]
#[async_trait::async_trait]
pub trait DraftBackend: std::fmt::Debug + Send + Sync {
    async fn load(
        &self,
        problem_id: Uuid,
        language: Language,
    ) -> Result<Option<Draft>, TransportError>;

    async fn save(&self, problem_id: Uuid, payload: &DraftPayload) -> Result<(), TransportError>;

    async fn delete(&self, problem_id: Uuid) -> Result<(), TransportError>;
}
