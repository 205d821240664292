//! Gemini LLM provider implementation.
//!
//! Talks to the Generative Language REST API:
//! https://ai.google.dev/api/generate-content

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use companion_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Gemini `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini `generateContent` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini LLM client.
pub struct GeminiClient {
    /// Base URL for the Generative Language API
    base_url: String,

    /// API key sent as `x-goog-api-key`
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url("https://generativelanguage.googleapis.com", api_key)
    }

    /// Create a client against a custom endpoint (proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Convert LlmRequest to Gemini format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config,
        }
    }

    /// Convert a Gemini response to LlmResponse.
    ///
    /// A blocked prompt or a candidate without text is an error so the caller
    /// can fall back instead of returning an empty answer.
    fn convert_response(&self, response: GeminiResponse, model: &str) -> AppResult<LlmResponse> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(AppError::Llm(format!("Gemini blocked the prompt: {}", reason)));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Gemini returned no candidates".to_string()))?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::Llm(format!(
                "Gemini returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            usage,
            done: true,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Gemini");
        tracing::debug!("Model: {}, prompt bytes: {}", request.model, request.prompt.len());

        let body = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let converted = self.convert_response(gemini_response, &request.model)?;

        tracing::info!("Received completion from Gemini");
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}",
            converted.usage.prompt_tokens,
            converted.usage.completion_tokens
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::with_base_url("http://localhost:9999/", "key");
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_gemini_request_conversion() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("Hello", "gemini-2.5-flash")
            .with_temperature(0.2)
            .with_max_tokens(300);

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 300);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("Hello", "gemini-2.5-flash");

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_whole_prompt_is_the_single_user_turn() {
        let client = GeminiClient::new("key");
        let prompt = "You are UNITY Companion.\n\nPatient Question: hi";
        let request = LlmRequest::new(prompt, "gemini-2.5-flash");

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(json["contents"].as_array().unwrap().len(), 1);
        assert_eq!(json["contents"][0]["parts"][0]["text"], prompt);
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_convert_response_joins_parts() {
        let client = GeminiClient::new("key");
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "A low risk "}, {"text": "result is reassuring."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 8, "totalTokenCount": 48},
                "modelVersion": "gemini-2.5-flash-001"
            }"#,
        );

        let converted = client.convert_response(response, "gemini-2.5-flash").unwrap();
        assert_eq!(converted.content, "A low risk result is reassuring.");
        assert_eq!(converted.model, "gemini-2.5-flash-001");
        assert_eq!(converted.usage.total_tokens, 48);
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let client = GeminiClient::new("key");
        let response = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);

        let err = client.convert_response(response, "m").unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_candidate_is_an_error() {
        let client = GeminiClient::new("key");
        let response = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);

        let err = client.convert_response(response, "m").unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = GeminiClient::with_base_url("http://127.0.0.1:9", "key");
        let result = client.complete(&LlmRequest::new("Hi", "m")).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
