use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Sampling parameters shared by both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// An image sent alongside the prompt. Encoded as base64 on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePart {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AiRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub images: Vec<ImagePart>,
    pub options: GenerationOptions,
}

impl AiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_image(mut self, image: ImagePart) -> Self {
        self.images.push(image);
        self
    }

    /// System instruction, if one is set and not blank.
    pub fn system(&self) -> Option<&str> {
        self.system_instruction
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    pub text: String,
    pub total_tokens: Option<u32>,
}

/// A text-generation backend.
///
/// Implementations issue exactly one HTTP request per call and never retry.
/// Every failure comes back as a descriptive [`crate::error::NotebookError`].
#[async_trait]
pub trait AiService: Send + Sync {
    /// Short backend identifier, e.g. `"gemini"`.
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn generate(&self, request: &AiRequest, cancel: &CancellationToken)
        -> Result<AiResponse>;

    async fn health_check(&self, cancel: &CancellationToken) -> Result<()>;

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>>;
}
