use crate::error::{NotebookError, Result};
use crate::models::{Artifact, ChatMessage, SourceDocument, SourceType};
use crate::services::ask::AskQuestionResponse;

/// In-memory state of one notebook session.
///
/// Owned by a single caller. Handlers borrow slices of it and return values;
/// only the owner mutates it.
#[derive(Debug, Default)]
pub struct NotebookSession {
    sources: Vec<SourceDocument>,
    history: Vec<ChatMessage>,
    artifacts: Vec<Artifact>,
}

impl NotebookSession {
    pub fn new() -> Self {
        Self::default()
    }

    // Sources

    pub fn sources(&self) -> &[SourceDocument] {
        &self.sources
    }

    pub fn add_source(&mut self, source: SourceDocument) {
        tracing::debug!(name = %source.name, kind = %source.source_type, "Source added");
        self.sources.push(source);
    }

    pub fn add_sources(&mut self, sources: impl IntoIterator<Item = SourceDocument>) {
        for source in sources {
            self.add_source(source);
        }
    }

    pub fn source(&self, id: &str) -> Option<&SourceDocument> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn remove_source(&mut self, id: &str) -> Result<SourceDocument> {
        let index = self.index_of(id)?;
        Ok(self.sources.remove(index))
    }

    pub fn set_included(&mut self, id: &str, included: bool) -> Result<()> {
        let index = self.index_of(id)?;
        self.sources[index].is_included = included;
        Ok(())
    }

    /// Flip inclusion and return the new value.
    pub fn toggle_included(&mut self, id: &str) -> Result<bool> {
        let index = self.index_of(id)?;
        let source = &mut self.sources[index];
        source.is_included = !source.is_included;
        Ok(source.is_included)
    }

    pub fn included_sources(&self) -> impl Iterator<Item = &SourceDocument> {
        self.sources.iter().filter(|s| s.is_included)
    }

    /// Drop every vault note, keeping loaded documents. Returns how many were removed.
    pub fn clear_notes(&mut self) -> usize {
        let before = self.sources.len();
        self.sources.retain(|s| s.source_type != SourceType::Note);
        before - self.sources.len()
    }

    pub fn clear_sources(&mut self) {
        self.sources.clear();
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.sources
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| NotebookError::NotFound(format!("Source {id}")))
    }

    // Chat

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    pub fn record_exchange(&mut self, response: &AskQuestionResponse) {
        self.history.push(response.user_message.clone());
        self.history.push(response.assistant_message.clone());
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // Artifacts

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }
}
