use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::ContextAggregator;
use crate::error::Result;
use crate::intelligence::extract_citations;
use crate::llm::prompts::{artifact_prompt, grounded_system_instruction};
use crate::llm::{AiRequest, AiService, GenerationOptions};
use crate::models::{Artifact, ArtifactType, SourceDocument};
use crate::services::common::{require_context, require_included};

/// Generates FAQs, study guides, scripts and the like from the included sources.
pub struct GenerateArtifactHandler {
    ai: Arc<dyn AiService>,
    aggregator: ContextAggregator,
    options: GenerationOptions,
    language: Option<String>,
}

impl GenerateArtifactHandler {
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
        artifact_type: ArtifactType,
        sources: &[SourceDocument],
        cancel: &CancellationToken,
    ) -> Result<Artifact> {
        let included = require_included(sources)?;
        let context = self.aggregator.aggregate(&included);
        require_context(&context)?;

        let request = AiRequest::new(artifact_prompt(artifact_type, &context.context))
            .with_system_instruction(grounded_system_instruction(self.language.as_deref()))
            .with_options(self.options.clone());

        let response = self.ai.generate(&request, cancel).await?;
        let citations = extract_citations(&response.text);
        let title = artifact_title(artifact_type, &context.included_sources);

        tracing::info!(
            backend = self.ai.name(),
            artifact = %artifact_type,
            sources = context.included_count,
            "Generated artifact"
        );

        Ok(Artifact::new(
            artifact_type,
            title,
            response.text,
            context.included_sources,
            citations,
        ))
    }
}

pub fn artifact_title(artifact_type: ArtifactType, source_names: &[String]) -> String {
    let name = artifact_type.display_name();
    match source_names {
        [] => name.to_string(),
        [only] => format!("{name}: {only}"),
        [first, rest @ ..] => format!("{name}: {first} (+{} more)", rest.len()),
    }
}
