//! Character-budgeted grounding context.
//!
//! Included sources are wrapped in named delimiter blocks and concatenated in
//! caller order until the next block would overflow the budget. Blocks are
//! never split: a source either appears whole or not at all.
//!
//! Token counts reported here are estimates derived from a fixed
//! characters-per-token ratio, not the output of a tokenizer.

use serde::Serialize;

use crate::config::ContextConfig;
use crate::models::SourceDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedContext {
    pub context: String,
    /// Names of the sources that made it into `context`, in order.
    pub included_sources: Vec<String>,
    pub included_count: usize,
    pub omitted_count: usize,
    pub was_truncated: bool,
    /// `context` length in characters divided by the characters-per-token
    /// ratio, rounded down.
    pub approximate_tokens: usize,
}

impl AggregatedContext {
    fn empty() -> Self {
        Self {
            context: String::new(),
            included_sources: Vec::new(),
            included_count: 0,
            omitted_count: 0,
            was_truncated: false,
            approximate_tokens: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.included_count == 0
    }
}

#[derive(Debug, Clone)]
pub struct ContextAggregator {
    char_budget: usize,
    chars_per_token: usize,
}

impl ContextAggregator {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            char_budget: config.char_budget(),
            chars_per_token: config.chars_per_token.max(1),
        }
    }

    pub fn char_budget(&self) -> usize {
        self.char_budget
    }

    /// Aggregate only the sources flagged as included, preserving order.
    pub fn aggregate_included(&self, sources: &[SourceDocument]) -> AggregatedContext {
        let included: Vec<&SourceDocument> = sources.iter().filter(|s| s.is_included).collect();
        self.aggregate(&included)
    }

    pub fn aggregate(&self, sources: &[&SourceDocument]) -> AggregatedContext {
        if sources.is_empty() {
            return AggregatedContext::empty();
        }

        let mut context = String::new();
        let mut total_chars = 0usize;
        let mut included_sources = Vec::with_capacity(sources.len());

        for source in sources {
            let block = source_block(&source.name, &source.content);
            let block_chars = block.chars().count();

            if total_chars + block_chars > self.char_budget {
                break;
            }

            context.push_str(&block);
            total_chars += block_chars;
            included_sources.push(source.name.clone());
        }

        let included_count = included_sources.len();
        let omitted_count = sources.len() - included_count;
        let was_truncated = omitted_count > 0;

        if was_truncated {
            let notice = truncation_notice(omitted_count);
            total_chars += notice.chars().count();
            context.push_str(&notice);
        }

        let approximate_tokens = total_chars / self.chars_per_token;

        tracing::debug!(
            included = included_count,
            omitted = omitted_count,
            chars = total_chars,
            budget = self.char_budget,
            approximate_tokens,
            "Aggregated source context"
        );

        AggregatedContext {
            context,
            included_sources,
            included_count,
            omitted_count,
            was_truncated,
            approximate_tokens,
        }
    }
}

/// The delimiter block a source is wrapped in. The name appears on both
/// fences so the model can cite it as `[name]`.
pub(crate) fn source_block(name: &str, content: &str) -> String {
    format!("--- SOURCE: {name} ---\n{content}\n--- END SOURCE: {name} ---\n\n")
}

fn truncation_notice(omitted: usize) -> String {
    format!("[Note: {omitted} source(s) omitted because the context limit was reached.]\n")
}
