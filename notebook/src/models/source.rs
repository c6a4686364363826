use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Document,
    Note,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// A loaded file or vault note, parsed to plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub name: String,
    pub file_path: PathBuf,
    pub content: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub loaded_at: DateTime<Utc>,
    /// Whether the document takes part in AI context. The only field that
    /// changes after creation.
    pub is_included: bool,
}

impl SourceDocument {
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        content: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            file_path: file_path.into(),
            content: content.into(),
            source_type,
            loaded_at: Utc::now(),
            is_included: true,
        }
    }

    pub fn document(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, content, SourceType::Document)
    }

    pub fn note(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, content, SourceType::Note)
    }

    pub fn excluded(mut self) -> Self {
        self.is_included = false;
        self
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}
