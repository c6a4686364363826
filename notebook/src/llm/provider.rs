use std::sync::Arc;

use crate::config::{AiConfig, AiProviderKind};
use crate::error::Result;
use crate::llm::gemini::GeminiClient;
use crate::llm::ollama::OllamaClient;
use crate::llm::service::AiService;

/// Build the backend selected by `config.provider`.
///
/// Fails up front when the selected backend cannot be constructed, e.g. a
/// Gemini provider without an API key.
pub fn create_ai_service(config: &AiConfig) -> Result<Arc<dyn AiService>> {
    let service: Arc<dyn AiService> = match config.provider {
        AiProviderKind::Gemini => Arc::new(GeminiClient::new(&config.gemini)?),
        AiProviderKind::Ollama => Arc::new(OllamaClient::new(&config.ollama)?),
    };

    tracing::debug!(
        backend = service.name(),
        model = service.model(),
        "AI service created"
    );

    Ok(service)
}
