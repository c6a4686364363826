//! Source-grounded AI notebook.
//!
//! Load documents and Obsidian notes, pick which ones are included, then ask
//! questions or generate study artifacts that an AI backend (Gemini or a local
//! Ollama daemon) answers from those sources only, citing them as `[Name]`.

pub mod config;
pub mod context;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod models;
pub mod processing;
pub mod services;
pub mod vault;

pub use config::Config;
pub use error::{NotebookError, Result};
