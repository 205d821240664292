//! Prompt builder for rendering the RAG template.

use crate::templates::{HISTORY_WINDOW, NO_HISTORY, RAG_TEMPLATE, SYSTEM_INSTRUCTION};
use crate::types::{BuiltPrompt, ChatMessage};
use companion_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

const TEMPLATE_NAME: &str = "rag";

/// Composes the system instruction, retrieved context, chat history and
/// question into the prompt sent to the model.
///
/// The template is compiled once; the builder is then shared read-only
/// between requests.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
    system: String,
}

impl PromptBuilder {
    /// Create a builder with the standard system instruction and template.
    pub fn new() -> AppResult<Self> {
        Self::with_template(SYSTEM_INSTRUCTION, RAG_TEMPLATE)
    }

    /// Create a builder with a custom system instruction and template.
    ///
    /// The template may reference `context`, `chat_history` and `question`.
    pub fn with_template(system: impl Into<String>, template: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self {
            registry,
            system: system.into(),
        })
    }

    /// Build the prompt for one question.
    ///
    /// # Arguments
    /// * `context` - Retrieved knowledge, or the no-information sentinel
    /// * `chat_history` - Prior turns, oldest first, excluding the current question
    /// * `question` - The patient's current message
    ///
    /// # Example
    /// ```no_run
    /// use companion_prompt::{ChatMessage, PromptBuilder};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let builder = PromptBuilder::new()?;
    /// let history = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")];
    /// let built = builder.build("No relevant information found", &history, "What is SMA?")?;
    /// println!("{}", built.full_text());
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(
        &self,
        context: &str,
        chat_history: &[ChatMessage],
        question: &str,
    ) -> AppResult<BuiltPrompt> {
        let mut variables = HashMap::new();
        variables.insert("context", context.to_string());
        variables.insert("chat_history", format_chat_history(chat_history));
        variables.insert("question", question.to_string());

        let user = self
            .registry
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        tracing::debug!(
            "Built prompt: {} history turns, {} bytes",
            chat_history.len().min(HISTORY_WINDOW),
            user.len()
        );

        Ok(BuiltPrompt::new(self.system.clone(), user))
    }
}

/// Render the last few turns as `Patient: ...` / `Assistant: ...` lines.
///
/// Older turns are dropped; an empty history renders as a fixed sentinel.
pub fn format_chat_history(history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return NO_HISTORY.to_string();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
        .collect::<Vec<_>>()
        .join("\n")
}
