use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::ContextAggregator;
use crate::error::{NotebookError, Result};
use crate::intelligence::extract_citations;
use crate::llm::prompts::{grounded_system_instruction, question_prompt};
use crate::llm::{AiRequest, AiService, GenerationOptions};
use crate::models::{ChatMessage, SourceDocument};
use crate::services::common::{require_context, require_included, ContextSummary};

#[derive(Debug, Clone, Copy)]
pub struct AskQuestionRequest<'a> {
    pub question: &'a str,
    pub sources: &'a [SourceDocument],
    pub history: &'a [ChatMessage],
}

#[derive(Debug, Clone)]
pub struct AskQuestionResponse {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
    pub context: ContextSummary,
    pub total_tokens: Option<u32>,
}

/// Answers a question grounded in the included sources.
pub struct AskQuestionHandler {
    ai: Arc<dyn AiService>,
    aggregator: ContextAggregator,
    options: GenerationOptions,
    language: Option<String>,
}

impl AskQuestionHandler {
    pub fn new(ai: Arc<dyn AiService>, config: &Config) -> Self {
        Self {
            ai,
            aggregator: ContextAggregator::new(&config.context),
            options: config.generation.clone(),
            language: config.language.clone(),
        }
    }

    pub async fn handle(
        &self,
        request: AskQuestionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<AskQuestionResponse> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(NotebookError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }

        let included = require_included(request.sources)?;
        let context = self.aggregator.aggregate(&included);
        require_context(&context)?;

        if context.was_truncated {
            tracing::warn!(
                omitted = context.omitted_count,
                "Context limit reached, some sources were left out"
            );
        }

        let ai_request = AiRequest::new(question_prompt(&context.context, request.history, question))
            .with_system_instruction(grounded_system_instruction(self.language.as_deref()))
            .with_options(self.options.clone());

        let response = self.ai.generate(&ai_request, cancel).await?;
        let citations = extract_citations(&response.text);

        tracing::info!(
            backend = self.ai.name(),
            sources = context.included_count,
            citations = citations.len(),
            tokens = ?response.total_tokens,
            "Answered question"
        );

        Ok(AskQuestionResponse {
            user_message: ChatMessage::user(question),
            assistant_message: ChatMessage::assistant(response.text, citations),
            context: ContextSummary::from(&context),
            total_tokens: response.total_tokens,
        })
    }
}
