use crate::core::domain::Language;
use crate::core::traits::TransportError;

#[mockall::automock]
#[async_trait::async_trait]
pub trait Formatter: std::fmt::Debug + Send + Sync {
    async fn format(&self, code: &str, language: Language) -> Result<String, TransportError>;
}
