//! LLM integration crate for the Unity Companion backend.
//!
//! This crate provides a provider-agnostic abstraction for the hosted
//! text-generation model behind a single trait.
//!
//! # Providers
//! - **Gemini**: hosted model, requires an API key (default)
//! - **Ollama**: local runtime for development
//!
//! # Example
//! ```no_run
//! use companion_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
pub use types::ProviderType;
