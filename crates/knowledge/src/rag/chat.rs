//! Chat orchestration: retrieve, prompt, generate, filter.

use crate::rag::generate::{FallbackReason, Generator};
use crate::rag::types::ChatResult;
use crate::retrieval::Retriever;
use crate::types::KnowledgeBase;
use companion_core::{AppError, AppResult};
use companion_prompt::{ChatMessage, PromptBuilder};
use companion_safety::SafetyFilter;
use std::sync::Arc;

/// The patient chat pipeline.
///
/// Cheap to clone; every clone shares the same read-only knowledge base,
/// prompt builder and model client, so one instance serves all requests.
#[derive(Clone)]
pub struct ChatService {
    retriever: Retriever,
    prompts: Arc<PromptBuilder>,
    generator: Arc<Generator>,
    safety: SafetyFilter,
}

impl ChatService {
    /// Assemble the pipeline with the standard prompt and safety rules.
    pub fn new(knowledge: Arc<KnowledgeBase>, generator: Generator) -> AppResult<Self> {
        Ok(Self::with_parts(
            Retriever::new(knowledge),
            PromptBuilder::new()?,
            generator,
            SafetyFilter::new(),
        ))
    }

    pub fn with_parts(
        retriever: Retriever,
        prompts: PromptBuilder,
        generator: Generator,
        safety: SafetyFilter,
    ) -> Self {
        Self {
            retriever,
            prompts: Arc::new(prompts),
            generator: Arc::new(generator),
            safety,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn safety(&self) -> &SafetyFilter {
        &self.safety
    }

    /// Answer the last message of a conversation.
    ///
    /// Earlier messages form the chat history. Only an empty conversation is
    /// an error; model failures degrade to a fallback answer.
    pub async fn respond(&self, messages: &[ChatMessage]) -> AppResult<ChatResult> {
        let Some((current, history)) = messages.split_last() else {
            return Err(AppError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        };
        let question = current.content.as_str();

        let should_escalate = self.safety.should_escalate(question);

        let retrieval = self.retriever.retrieve(question);
        let had_matches = retrieval.has_matches();

        let generation = match self.prompts.build(&retrieval.context, history, question) {
            Ok(prompt) => {
                self.generator
                    .generate(&prompt.full_text(), question, had_matches)
                    .await
            }
            Err(e) => {
                tracing::error!("Prompt build failed: {}", e);
                self.generator.fallback(question, FallbackReason::PromptError)
            }
        };

        let validation = self.safety.inspect(&generation.answer);

        tracing::info!(
            sources = retrieval.sources.len(),
            confidence = generation.confidence,
            fallback = generation.is_fallback(),
            escalate = should_escalate,
            verdict = ?validation.verdict,
            "Chat request answered"
        );

        Ok(ChatResult {
            response: validation.text,
            confidence: generation.confidence,
            should_escalate,
            sources: retrieval.sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultTypeCatalog;

    fn empty_base() -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase {
            conditions: vec![],
            result_types: ResultTypeCatalog {
                low_risk: "low".to_string(),
                high_risk: "high".to_string(),
                carrier_positive: "carrier".to_string(),
            },
        })
    }

    #[tokio::test]
    async fn test_empty_conversation_is_invalid() {
        let service = ChatService::new(empty_base(), Generator::fallback_only()).unwrap();
        let err = service.respond(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let service = ChatService::new(empty_base(), Generator::fallback_only()).unwrap();
        let clone = service.clone();
        assert!(Arc::ptr_eq(&service.generator, &clone.generator));
        assert!(Arc::ptr_eq(&service.prompts, &clone.prompts));
    }
}
