use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::GeminiConfig;
use crate::error::{NotebookError, Result};
use crate::llm::http::{build_client, cancellable, check_status, transport_error, trim_base_url};
use crate::llm::service::{AiRequest, AiResponse, AiService};

const BACKEND: &str = "Gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| NotebookError::AiAuth("Gemini API key is not configured".to_string()))?;

        Ok(Self {
            client: build_client(BACKEND, config.timeout_secs)?,
            api_key,
            base_url: trim_base_url(&config.base_url),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(request: &AiRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        parts.extend(request.images.iter().map(|image| Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: STANDARD.encode(&image.data),
            },
        }));

        GenerateContentRequest {
            system_instruction: request.system().map(|text| Content {
                role: None,
                parts: vec![Part::Text {
                    text: text.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.options.temperature,
                top_k: request.options.top_k,
                top_p: request.options.top_p,
                max_output_tokens: request.options.max_output_tokens,
            },
        }
    }

    fn extract_response(body: GenerateContentResponse) -> Result<AiResponse> {
        let total_tokens = body
            .usage_metadata
            .and_then(|usage| usage.total_token_count);

        let Some(candidate) = body.candidates.into_iter().next() else {
            let reason = body
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!(" (blocked: {reason})"))
                .unwrap_or_default();
            return Err(NotebookError::Ai(format!(
                "Gemini response contained no candidates{reason}"
            )));
        };

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let text = candidate
            .content
            .ok_or_else(|| {
                NotebookError::Ai(format!(
                    "Gemini candidate contained no content (finish reason: {finish_reason})"
                ))
            })?
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| NotebookError::Ai("Gemini candidate contained no parts".to_string()))?
            .text
            .ok_or_else(|| NotebookError::Ai("Gemini response part contained no text".to_string()))?;

        if text.trim().is_empty() {
            return Err(NotebookError::Ai(
                "Gemini response contained empty text".to_string(),
            ));
        }

        Ok(AiResponse { text, total_tokens })
    }
}

#[async_trait]
impl AiService for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
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

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::build_request(request);

        tracing::debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            images = request.images.len(),
            "Sending Gemini request"
        );

        cancellable(cancel, async {
            let response = self
                .client
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error(BACKEND, self.timeout_secs, e))?;

            let response = check_status(BACKEND, response).await?;
            let parsed: GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| transport_error(BACKEND, self.timeout_secs, e))?;

            Self::extract_response(parsed)
        })
        .await
    }

    async fn health_check(&self, cancel: &CancellationToken) -> Result<()> {
        self.list_models(cancel).await.map(|_| ())
    }

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let list: ModelList = cancellable(cancel, async {
            let response = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await
                .map_err(|e| transport_error(BACKEND, self.timeout_secs, e))?;

            let response = check_status(BACKEND, response).await?;
            response
                .json()
                .await
                .map_err(|e| transport_error(BACKEND, self.timeout_secs, e))
        })
        .await?;

        Ok(list
            .models
            .into_iter()
            .map(|entry| {
                entry
                    .name
                    .strip_prefix("models/")
                    .map(str::to_string)
                    .unwrap_or(entry.name)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::service::ImagePart;
    use serde_json::json;

    fn config() -> GeminiConfig {
        GeminiConfig {
            api_key: Some("key".to_string()),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = GeminiClient::new(&GeminiConfig::default()).unwrap_err();
        assert!(matches!(err, NotebookError::AiAuth(_)));
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = AiRequest::new("What is Rust?")
            .with_system_instruction("Answer from sources")
            .with_image(ImagePart::new("image/png", b"png".to_vec()));

        let body = serde_json::to_value(GeminiClient::build_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Answer from sources");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "What is Rust?");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"],
            json!({"mimeType": "image/png", "data": "cG5n"})
        );
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_request_without_system_instruction_omits_field() {
        let body = serde_json::to_value(GeminiClient::build_request(&AiRequest::new("q"))).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_first_candidate_text() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"parts": [{"text": "other"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 42}
        }))
        .unwrap();

        let response = GeminiClient::extract_response(body).unwrap();
        assert_eq!(response.text, "first");
        assert_eq!(response.total_tokens, Some(42));
    }

    #[test]
    fn test_extract_reports_block_reason() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        let err = GeminiClient::extract_response(body).unwrap_err();
        assert!(err.to_string().contains("no candidates (blocked: SAFETY)"));
    }

    #[test]
    fn test_extract_missing_content() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();

        let err = GeminiClient::extract_response(body).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = GeminiClient::new(&GeminiConfig {
            base_url: "http://localhost:9999/v1beta/".to_string(),
            ..config()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/v1beta");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }
}
