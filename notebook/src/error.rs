use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotebookError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No sources are included. Select at least one source before asking the AI.")]
    NoSourcesIncluded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("AI unavailable: {0}")]
    AiUnavailable(String),

    #[error("AI authentication error: {0}")]
    AiAuth(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Vault error: {0}")]
    Vault(String),
}

impl NotebookError {
    /// Whether the error was caused by the caller's input rather than by a
    /// backend or the filesystem.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            NotebookError::Validation(_)
                | NotebookError::NoSourcesIncluded
                | NotebookError::NotFound(_)
                | NotebookError::UnsupportedFormat(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NotebookError>;
