mod gemini;
mod http;
mod ollama;
pub mod prompts;
mod provider;
mod service;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use provider::create_ai_service;
pub use service::{AiRequest, AiResponse, AiService, GenerationOptions, ImagePart};
