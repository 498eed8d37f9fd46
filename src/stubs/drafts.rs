use dashmap::DashMap;
use uuid::Uuid;

use crate::core::domain::{Draft, DraftPayload, Language};
use crate::core::traits::TransportError;
use crate::core::traits::drafts::DraftBackend;

/// In-memory draft persistence keyed by (problem, language). Stands in for
/// the remote draft endpoints in the demo binary and in integration-style
/// tests.
#[derive(Debug, Default)]
pub struct InMemoryDraftBackend {
    drafts: DashMap<(Uuid, Language), Draft>,
}

impl InMemoryDraftBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[async_trait::async_trait]
impl DraftBackend for InMemoryDraftBackend {
    async fn load(
        &self,
        problem_id: Uuid,
        language: Language,
    ) -> Result<Option<Draft>, TransportError> {
        Ok(self
            .drafts
            .get(&(problem_id, language))
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, problem_id: Uuid, payload: &DraftPayload) -> Result<(), TransportError> {
        self.drafts.insert(
            (problem_id, payload.language),
            Draft {
                problem_id,
                language: payload.language,
                code: payload.code.clone(),
                updated_at: chrono::Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, problem_id: Uuid) -> Result<(), TransportError> {
        self.drafts.retain(|(id, _), _| *id != problem_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let backend = InMemoryDraftBackend::new();
        let problem_id = Uuid::new_v4();
        let payload = DraftPayload {
            code: "x = 1".to_string(),
            language: Language::Python,
        };

        backend.save(problem_id, &payload).await.unwrap();
        assert_eq!(backend.len(), 1);

        let draft = backend
            .load(problem_id, Language::Python)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(draft.code, "x = 1");
        assert_eq!(draft.language, Language::Python);
        assert_eq!(draft.problem_id, problem_id);
        assert!(draft.updated_at <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn test_delete_removes_all_languages_for_the_problem() {
        let backend = InMemoryDraftBackend::new();
        let problem_id = Uuid::new_v4();
        for (language, code) in [(Language::Python, "x = 1"), (Language::GnuCpp, "int x;")] {
            backend
                .save(
                    problem_id,
                    &DraftPayload {
                        code: code.to_string(),
                        language,
                    },
                )
                .await
                .unwrap();
        }

        backend.delete(problem_id).await.unwrap();

        assert!(backend.is_empty());
        assert!(
            backend
                .load(problem_id, Language::Python)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_drafts_are_kept_per_language() {
        let backend = InMemoryDraftBackend::new();
        let problem_id = Uuid::new_v4();
        backend
            .save(
                problem_id,
                &DraftPayload {
                    code: "python draft".to_string(),
                    language: Language::Python,
                },
            )
            .await
            .unwrap();

        assert!(
            backend
                .load(problem_id, Language::GnuCpp)
                .await
                .unwrap()
                .is_none()
        );
    }
}
