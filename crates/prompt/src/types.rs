//! Prompt types for the Unity Companion backend.
//!
//! This module defines the conversation entities supplied by the caller and
//! the prompt handed to the generator.

use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when the message is rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Patient",
            Role::Assistant => "Assistant",
        }
    }
}

/// One turn of the conversation, as supplied by the caller.
///
/// Messages live only for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a patient message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Fixed system instruction
    pub system: String,

    /// Rendered RAG template
    pub user: String,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// The single prompt string sent to the model: system instruction, blank line, template.
    pub fn full_text(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_deserialization() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hello"}"#).unwrap();
        assert_eq!(msg, ChatMessage::assistant("Hello"));

        let bad = serde_json::from_str::<ChatMessage>(r#"{"role":"system","content":"x"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.label(), "Patient");
        assert_eq!(Role::Assistant.label(), "Assistant");
    }

    #[test]
    fn test_full_text_order() {
        let built = BuiltPrompt::new("SYSTEM", "TEMPLATE");
        assert_eq!(built.full_text(), "SYSTEM\n\nTEMPLATE");
    }
}
