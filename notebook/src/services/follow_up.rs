use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::ContextAggregator;
use crate::error::{NotebookError, Result};
use crate::llm::prompts::{
    follow_up_prompt, grounded_system_instruction, parse_follow_up_questions,
    DEFAULT_FOLLOW_UP_COUNT,
};
use crate::llm::{AiRequest, AiService, GenerationOptions};
use crate::models::{ChatMessage, SourceDocument};
use crate::services::common::{require_context, require_included};

/// Suggests questions to ask after the latest answer.
pub struct GenerateFollowUpQuestionsHandler {
    ai: Arc<dyn AiService>,
    aggregator: ContextAggregator,
    options: GenerationOptions,
    language: Option<String>,
    count: usize,
}

impl GenerateFollowUpQuestionsHandler {
    pub fn new(ai: Arc<dyn AiService>, config: &Config) -> Self {
        Self {
            ai,
            aggregator: ContextAggregator::new(&config.context),
            options: config.generation.clone(),
            language: config.language.clone(),
            count: DEFAULT_FOLLOW_UP_COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    pub async fn handle(
        &self,
        sources: &[SourceDocument],
        history: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let included = require_included(sources)?;
        let (question, answer) = last_exchange(history).ok_or_else(|| {
            NotebookError::Validation("No conversation to follow up on".to_string())
        })?;

        let context = self.aggregator.aggregate(&included);
        require_context(&context)?;

        let request = AiRequest::new(follow_up_prompt(
            &context.context,
            &question.content,
            &answer.content,
            self.count,
        ))
        .with_system_instruction(grounded_system_instruction(self.language.as_deref()))
        .with_options(self.options.clone());

        let response = self.ai.generate(&request, cancel).await?;
        let questions = parse_follow_up_questions(&response.text, self.count);

        tracing::debug!(count = questions.len(), "Generated follow-up questions");

        Ok(questions)
    }
}

/// The last assistant message and the user message right before it.
fn last_exchange(history: &[ChatMessage]) -> Option<(&ChatMessage, &ChatMessage)> {
    let answer_index = history.iter().rposition(ChatMessage::is_assistant)?;
    let question = history[..answer_index]
        .iter()
        .rev()
        .find(|msg| msg.is_user())?;
    Some((question, &history[answer_index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_exchange_picks_latest_pair() {
        let history = vec![
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1", Vec::new()),
            ChatMessage::user("q2"),
            ChatMessage::assistant("a2", Vec::new()),
        ];
        let (question, answer) = last_exchange(&history).unwrap();
        assert_eq!(question.content, "q2");
        assert_eq!(answer.content, "a2");
    }

    #[test]
    fn test_last_exchange_ignores_trailing_question() {
        let history = vec![
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1", Vec::new()),
            ChatMessage::user("pending"),
        ];
        let (question, _) = last_exchange(&history).unwrap();
        assert_eq!(question.content, "q1");
    }

    #[test]
    fn test_last_exchange_requires_answer() {
        assert!(last_exchange(&[]).is_none());
        assert!(last_exchange(&[ChatMessage::user("q")]).is_none());
        assert!(last_exchange(&[ChatMessage::assistant("a", Vec::new())]).is_none());
    }
}
