use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::{NotebookError, Result};

/// Turns a file into plain text.
///
/// Binary formats (PDF, DOCX, PPTX, EPUB) plug in here; the notebook only
/// ever sees the extracted text.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Lowercase file extensions this parser accepts, without the dot.
    fn extensions(&self) -> &[&'static str];

    /// Extract the text of `path`, giving up with `Cancelled` once `cancel` fires.
    async fn parse(&self, path: &Path, cancel: &CancellationToken) -> Result<String>;

    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Reads UTF-8 text formats as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv", "json", "log", "rst"];

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn extensions(&self) -> &[&'static str] {
        PLAIN_TEXT_EXTENSIONS
    }

    async fn parse(&self, path: &Path, cancel: &CancellationToken) -> Result<String> {
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(NotebookError::Cancelled),
            bytes = tokio::fs::read(path) => bytes?,
        };
        String::from_utf8(bytes).map_err(|_| {
            NotebookError::UnsupportedFormat(format!("{} is not valid UTF-8 text", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_is_case_insensitive() {
        let parser = PlainTextParser;
        assert!(parser.supports("MD"));
        assert!(parser.supports("txt"));
        assert!(!parser.supports("pdf"));
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xFF, 0xFE, 0x00]).unwrap();

        let err = PlainTextParser
            .parse(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NotebookError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "text").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = PlainTextParser.parse(&path, &cancel).await.unwrap_err();
        assert!(matches!(err, NotebookError::Cancelled));
    }
}
