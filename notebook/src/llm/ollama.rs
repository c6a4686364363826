use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::OllamaConfig;
use crate::error::{NotebookError, Result};
use crate::llm::http::{build_client, cancellable, check_status, transport_error, trim_base_url};
use crate::llm::service::{AiRequest, AiResponse, AiService};

const BACKEND: &str = "Ollama";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Client for a local Ollama daemon (`/api/chat`, `/api/tags`).
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(BACKEND, config.timeout_secs)?,
            base_url: trim_base_url(&config.base_url),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request<'a>(&'a self, request: &AiRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = request.system() {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
                images: Vec::new(),
            });
        }

        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
            images: request
                .images
                .iter()
                .map(|image| STANDARD.encode(&image.data))
                .collect(),
        });

        ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: request.options.temperature,
                top_k: request.options.top_k,
                top_p: request.options.top_p,
                num_predict: request.options.max_output_tokens,
            },
        }
    }

    fn extract_response(body: ChatResponse) -> Result<AiResponse> {
        let total_tokens = match (body.prompt_eval_count, body.eval_count) {
            (None, None) => None,
            (prompt, eval) => Some(prompt.unwrap_or(0).saturating_add(eval.unwrap_or(0))),
        };

        let text = body
            .message
            .ok_or_else(|| NotebookError::Ai("Ollama response contained no message".to_string()))?
            .content
            .ok_or_else(|| {
                NotebookError::Ai("Ollama response message contained no content".to_string())
            })?;

        if text.trim().is_empty() {
            return Err(NotebookError::Ai(
                "Ollama response contained empty content".to_string(),
            ));
        }

        Ok(AiResponse { text, total_tokens })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> NotebookError {
        if error.is_connect() {
            NotebookError::AiUnavailable(format!(
                "Ollama is not reachable at {}: {error}. Is the daemon running?",
                self.base_url
            ))
        } else {
            transport_error(BACKEND, self.timeout_secs, error)
        }
    }

    async fn fetch_tags(&self, cancel: &CancellationToken) -> Result<TagsResponse> {
        let url = format!("{}/api/tags", self.base_url);
        cancellable(cancel, async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| self.map_transport_error(e))?;

            let response = check_status(BACKEND, response).await?;
            response.json().await.map_err(|e| self.map_transport_error(e))
        })
        .await
    }
}

#[async_trait]
impl AiService for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &AiRequest,
        cancel: &CancellationToken,
    ) -> Result<AiResponse> {
        if request.prompt.trim().is_empty() {
            return Err(NotebookError::Validation("Prompt cannot be empty".to_string()));
        }

        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request(request);

        tracing::debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            images = request.images.len(),
            "Sending Ollama request"
        );

        cancellable(cancel, async {
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| self.map_transport_error(e))?;

            let response = check_status(BACKEND, response).await?;
            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| self.map_transport_error(e))?;

            Self::extract_response(parsed)
        })
        .await
    }

    async fn health_check(&self, cancel: &CancellationToken) -> Result<()> {
        self.fetch_tags(cancel).await.map(|_| ())
    }

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        Ok(self
            .fetch_tags(cancel)
            .await?
            .models
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::service::ImagePart;
    use serde_json::json;

    fn client() -> OllamaClient {
        OllamaClient::new(&OllamaConfig::default()).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let request = AiRequest::new("Summarize")
            .with_system_instruction("Use sources only")
            .with_image(ImagePart::new("image/png", b"png".to_vec()));

        let body = serde_json::to_value(client.build_request(&request)).unwrap();

        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0].get("images").is_none());
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Summarize");
        assert_eq!(body["messages"][1]["images"], json!(["cG5n"]));
        assert_eq!(body["options"]["num_predict"], 2048);
        assert_eq!(body["options"]["top_k"], 40);
    }

    #[test]
    fn test_request_without_system_has_single_message() {
        let client = client();
        let body = serde_json::to_value(client.build_request(&AiRequest::new("q"))).unwrap();
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_extract_response_sums_token_counts() {
        let body: ChatResponse = serde_json::from_value(json!({
            "model": "llama3.2",
            "message": {"role": "assistant", "content": "answer"},
            "done": true,
            "prompt_eval_count": 10,
            "eval_count": 5
        }))
        .unwrap();

        let response = OllamaClient::extract_response(body).unwrap();
        assert_eq!(response.text, "answer");
        assert_eq!(response.total_tokens, Some(15));
    }

    #[test]
    fn test_extract_response_without_counts() {
        let body: ChatResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "answer"}
        }))
        .unwrap();
        assert_eq!(OllamaClient::extract_response(body).unwrap().total_tokens, None);
    }

    #[test]
    fn test_extract_response_saturates_token_counts() {
        let body: ChatResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "answer"},
            "prompt_eval_count": u32::MAX,
            "eval_count": 7
        }))
        .unwrap();
        assert_eq!(
            OllamaClient::extract_response(body).unwrap().total_tokens,
            Some(u32::MAX)
        );
    }

    #[test]
    fn test_extract_response_missing_message() {
        let body: ChatResponse = serde_json::from_value(json!({"done": true})).unwrap();
        let err = OllamaClient::extract_response(body).unwrap_err();
        assert!(err.to_string().contains("no message"));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = OllamaClient::new(&OllamaConfig {
            base_url: "http://127.0.0.1:11434/".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");
    }
}
