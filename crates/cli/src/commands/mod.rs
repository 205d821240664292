//! Command handlers for the Unity Companion CLI.

pub mod ask;
pub mod knowledge;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use knowledge::KnowledgeCommand;
pub use serve::ServeCommand;

use companion_core::{config::AppConfig, AppResult};
use companion_knowledge::{ChatService, Generator, KnowledgeBase};
use std::sync::Arc;

/// Load the configured knowledge file.
pub fn load_knowledge(config: &AppConfig) -> AppResult<Arc<KnowledgeBase>> {
    Ok(Arc::new(KnowledgeBase::load(&config.knowledge_file())?))
}

/// Build the chat pipeline from configuration.
pub fn build_chat_service(config: &AppConfig) -> AppResult<ChatService> {
    let knowledge = load_knowledge(config)?;
    let generator = Generator::from_config(config)?;
    ChatService::new(knowledge, generator)
}
