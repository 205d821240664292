//! Answer generation with a deterministic fallback.

use companion_core::{AppConfig, AppError, AppResult};
use companion_llm::{create_client, LlmClient, LlmRequest, ProviderType};
use std::sync::Arc;
use std::time::Duration;

/// Confidence of a model answer when retrieval matched a condition.
pub const MODEL_CONFIDENCE_WITH_SOURCES: f32 = 0.85;

/// Confidence of a model answer when retrieval found nothing.
pub const MODEL_CONFIDENCE_WITHOUT_SOURCES: f32 = 0.5;

/// Confidence of any fallback answer.
pub const FALLBACK_CONFIDENCE: f32 = 0.4;

/// Upper bound on one model call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fallback branch: fires when the lower-cased question contains any trigger.
pub struct FallbackRule {
    pub triggers: &'static [&'static str],
    pub response: &'static str,
}

/// Fallback branches in evaluation order.
pub static FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        triggers: &["low risk"],
        response: "A 'low risk' result means the chance of your baby having \
that condition is significantly reduced. This is reassuring news! \
Continue your routine prenatal care.",
    },
    FallbackRule {
        triggers: &["high risk"],
        response: "A 'high risk' result indicates an increased chance, but it is \
NOT a diagnosis. I recommend speaking with a genetic counselor \
to discuss confirmatory testing options.",
    },
    FallbackRule {
        triggers: &["counselor", "talk", "speak", "help"],
        response: "I recommend scheduling a consultation with a genetic counselor. \
You can reach them at unityscreen.com/schedule-a-consult \
or call 650-460-2551.",
    },
];

/// Used when no fallback rule fires.
pub const DEFAULT_FALLBACK: &str = "I'm here to help you understand your UNITY Complete results. \
Feel free to ask about specific conditions, what your results mean, \
or how to connect with a genetic counselor.";

/// Pick the canned answer for a question. Deterministic.
pub fn fallback_response(question: &str) -> &'static str {
    let lower = question.to_lowercase();

    FALLBACK_RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|t| lower.contains(t)))
        .map(|rule| rule.response)
        .unwrap_or(DEFAULT_FALLBACK)
}

/// Why the fallback responder was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No model client is configured
    NoCredential,
    /// The model call returned an error
    ProviderError,
    /// The model call exceeded the timeout
    Timeout,
    /// The prompt could not be built
    PromptError,
}

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOrigin {
    Model,
    Fallback(FallbackReason),
}

/// An unfiltered answer and its coarse confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub answer: String,
    pub confidence: f32,
    pub origin: GenerationOrigin,
}

impl Generation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, GenerationOrigin::Fallback(_))
    }
}

/// Calls the hosted model once per question and falls back to canned
/// answers on any failure.
pub struct Generator {
    client: Option<Arc<dyn LlmClient>>,
    model: String,
    timeout: Duration,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl Generator {
    /// Create a generator backed by a model client.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a generator that always uses the fallback responder.
    pub fn fallback_only() -> Self {
        Self {
            client: None,
            model: String::new(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the generator described by the configuration.
    ///
    /// A missing credential for a provider that needs one is not an error:
    /// the generator is built without a client and answers from the
    /// fallback rules.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider = ProviderType::parse(&config.provider)
            .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", config.provider)))?;
        let api_key = config.resolve_api_key();

        let mut generator = if provider.requires_api_key() && api_key.is_none() {
            tracing::warn!(
                "{} is not set; answers will come from the fallback responder",
                config.api_key_env
            );
            Self::fallback_only()
        } else {
            let client = create_client(provider.as_str(), config.endpoint.as_deref(), api_key)
                .map_err(AppError::Config)?;
            tracing::info!(
                "Using {} model {}",
                client.provider_name(),
                config.model
            );
            Self::new(client, config.model.clone())
        };

        generator.timeout = Duration::from_secs(config.generation.timeout_secs);
        generator.temperature = config.generation.temperature;
        generator.max_tokens = config.generation.max_tokens;

        Ok(generator)
    }

    /// Whether a model client is configured.
    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer a question from the full prompt.
    ///
    /// Never fails: errors and timeouts are logged and replaced by the
    /// fallback answer for `question`. Single attempt, no retry.
    pub async fn generate(&self, prompt: &str, question: &str, had_matches: bool) -> Generation {
        let Some(client) = &self.client else {
            return self.fallback(question, FallbackReason::NoCredential);
        };

        let request = self.request(prompt);

        match tokio::time::timeout(self.timeout, client.complete(&request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    "Model answered: {} bytes, {} tokens",
                    response.content.len(),
                    response.usage.total_tokens
                );
                Generation {
                    answer: response.content,
                    confidence: if had_matches {
                        MODEL_CONFIDENCE_WITH_SOURCES
                    } else {
                        MODEL_CONFIDENCE_WITHOUT_SOURCES
                    },
                    origin: GenerationOrigin::Model,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = client.provider_name(),
                    "Generation failed, using fallback: {}",
                    e
                );
                self.fallback(question, FallbackReason::ProviderError)
            }
            Err(_) => {
                tracing::warn!(
                    provider = client.provider_name(),
                    "Generation timed out after {:?}, using fallback",
                    self.timeout
                );
                self.fallback(question, FallbackReason::Timeout)
            }
        }
    }

    /// The fallback answer for a question.
    pub fn fallback(&self, question: &str, reason: FallbackReason) -> Generation {
        tracing::debug!("Fallback answer ({:?})", reason);
        Generation {
            answer: fallback_response(question).to_string(),
            confidence: FALLBACK_CONFIDENCE,
            origin: GenerationOrigin::Fallback(reason),
        }
    }

    fn request(&self, prompt: &str) -> LlmRequest {
        let mut request = LlmRequest::new(prompt, self.model.clone());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}
