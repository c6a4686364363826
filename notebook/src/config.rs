use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::llm::GenerationOptions;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ai: AiConfig,
    pub context: ContextConfig,
    pub generation: GenerationOptions,
    pub vault: VaultConfig,
    /// Preferred response language, e.g. "German". `None` lets the model
    /// answer in the language of the question.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    Gemini,
    Ollama,
}

impl std::fmt::Display for AiProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for AiProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" | "local" => Ok(Self::Ollama),
            _ => Err(format!("Unknown AI provider: {s}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub provider: AiProviderKind,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
}

/// Cloud backend. Requires an API key.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Local daemon backend. No key.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Budget for the grounding context of a single prompt.
///
/// The budget is expressed in tokens but enforced in characters using a fixed
/// characters-per-token ratio. This is a heuristic, not a tokenizer: real
/// model-side token counts can differ noticeably from the estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    pub max_tokens: usize,
    pub chars_per_token: usize,
}

impl ContextConfig {
    pub fn char_budget(&self) -> usize {
        self.max_tokens.saturating_mul(self.chars_per_token.max(1))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfig {
    pub path: Option<PathBuf>,
    pub subfolder: Option<String>,
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: 30_000,
            chars_per_token: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let generation_defaults = GenerationOptions::default();

        Self {
            ai: AiConfig {
                provider: parse_env_or("AI_PROVIDER", AiProviderKind::Ollama),
                gemini: GeminiConfig {
                    api_key: env_non_empty("GEMINI_API_KEY"),
                    base_url: env::var("GEMINI_BASE_URL")
                        .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
                    model: env::var("GEMINI_MODEL")
                        .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                    timeout_secs: parse_env_or("GEMINI_TIMEOUT", 60),
                },
                ollama: OllamaConfig {
                    base_url: env::var("OLLAMA_BASE_URL")
                        .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string()),
                    model: env::var("OLLAMA_MODEL")
                        .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
                    timeout_secs: parse_env_or("OLLAMA_TIMEOUT", 300),
                },
            },
            context: ContextConfig {
                max_tokens: parse_env_or("CONTEXT_MAX_TOKENS", 30_000),
                chars_per_token: parse_env_or("CONTEXT_CHARS_PER_TOKEN", 4),
            },
            generation: GenerationOptions {
                temperature: parse_env_or("AI_TEMPERATURE", generation_defaults.temperature),
                max_output_tokens: parse_env_or(
                    "AI_MAX_OUTPUT_TOKENS",
                    generation_defaults.max_output_tokens,
                ),
                ..generation_defaults
            },
            vault: VaultConfig {
                path: env_non_empty("OBSIDIAN_VAULT_PATH").map(PathBuf::from),
                subfolder: env_non_empty("OBSIDIAN_SUBFOLDER"),
            },
            language: env_non_empty("RESPONSE_LANGUAGE"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
