use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{NotebookError, Result};
use crate::models::{SourceDocument, SourceType};
use crate::processing::parser::{DocumentParser, PlainTextParser};

/// Loads files into [`SourceDocument`]s, picking a parser by extension.
pub struct SourceLoader {
    parsers: Vec<Arc<dyn DocumentParser>>,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            parsers: vec![Arc::new(PlainTextParser)],
        }
    }

    /// Register an additional parser. Later parsers win for shared extensions.
    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parsers.insert(0, parser);
        self
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .parsers
            .iter()
            .flat_map(|p| p.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    fn parser_for(&self, extension: &str) -> Option<&Arc<dyn DocumentParser>> {
        self.parsers.iter().find(|p| p.supports(extension))
    }

    pub async fn load(&self, path: &Path, cancel: &CancellationToken) -> Result<SourceDocument> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let parser = self.parser_for(extension).ok_or_else(|| {
            NotebookError::UnsupportedFormat(format!(
                "Cannot load {}: unsupported file type '{extension}' (supported: {})",
                path.display(),
                self.supported_extensions().join(", ")
            ))
        })?;

        let content = parser.parse(path, cancel).await?;
        if content.trim().is_empty() {
            return Err(NotebookError::Validation(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let document = SourceDocument::new(name, path, content, SourceType::Document);
        tracing::info!(
            name = %document.name,
            chars = document.char_count(),
            words = document.word_count(),
            "Loaded source"
        );

        Ok(document)
    }

    /// Load several files, stopping at the first failure.
    pub async fn load_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
        cancel: &CancellationToken,
    ) -> Result<Vec<SourceDocument>> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load(path.as_ref(), cancel).await?);
        }
        Ok(documents)
    }
}
