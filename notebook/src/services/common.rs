use serde::Serialize;

use crate::context::AggregatedContext;
use crate::error::{NotebookError, Result};
use crate::models::SourceDocument;

/// Context accounting handed back to the caller alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub included_sources: Vec<String>,
    pub included_count: usize,
    pub omitted_count: usize,
    pub was_truncated: bool,
    pub approximate_tokens: usize,
}

impl From<&AggregatedContext> for ContextSummary {
    fn from(context: &AggregatedContext) -> Self {
        Self {
            included_sources: context.included_sources.clone(),
            included_count: context.included_count,
            omitted_count: context.omitted_count,
            was_truncated: context.was_truncated,
            approximate_tokens: context.approximate_tokens,
        }
    }
}

/// Included sources in order, or `NoSourcesIncluded` when there are none.
pub(crate) fn require_included(sources: &[SourceDocument]) -> Result<Vec<&SourceDocument>> {
    let included: Vec<&SourceDocument> = sources.iter().filter(|s| s.is_included).collect();
    if included.is_empty() {
        return Err(NotebookError::NoSourcesIncluded);
    }
    Ok(included)
}

/// Fails when every included source was too large to fit the budget.
pub(crate) fn require_context(context: &AggregatedContext) -> Result<()> {
    if context.is_empty() {
        return Err(NotebookError::Validation(format!(
            "None of the {} included source(s) fit within the context limit",
            context.omitted_count
        )));
    }
    Ok(())
}
