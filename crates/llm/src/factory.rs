//! LLM provider factory.
//!
//! Creates LLM clients from the configured provider name, endpoint and
//! credential.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Returns
/// A shared trait object implementing `LlmClient`
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::Gemini => {
            let api_key = api_key.ok_or_else(|| "Gemini provider requires API key".to_string())?;
            Ok(Arc::new(GeminiClient::with_base_url(base_url, api_key)))
        }
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(base_url))),
    }
}
