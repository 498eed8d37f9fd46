use std::time::Duration;

use crate::core::domain::Language;
use crate::core::traits::TransportError;
use crate::core::traits::format::Formatter;

/// Canned formatter backend with an artificial delay.
#[derive(Debug, Clone)]
pub struct FormatterStub {
    result: Result<String, TransportError>,
    delay: Duration,
}

impl FormatterStub {
    pub fn new(result: Result<String, TransportError>, delay: Duration) -> Self {
        Self { result, delay }
    }
}

#[async_trait::async_trait]
impl Formatter for FormatterStub {
    #[tracing::instrument]
    async fn format(&self, code: &str, language: Language) -> Result<String, TransportError> {
        tracing::debug!(language = language.as_str(), bytes = code.len(), "stub format");
        tokio::time::sleep(self.delay).await;
        self.result.clone()
    }
}
