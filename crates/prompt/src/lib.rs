//! Prompt system for the Unity Companion backend.
//!
//! This crate provides:
//! - Chat message types supplied by the caller
//! - The fixed system instruction and RAG template
//! - Handlebars rendering of context, history and question

pub mod builder;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::{format_chat_history, PromptBuilder};
pub use templates::{HISTORY_WINDOW, NO_HISTORY, RAG_TEMPLATE, SYSTEM_INSTRUCTION};
pub use types::{BuiltPrompt, ChatMessage, Role};
