//! Curated knowledge base and the patient chat pipeline.
//!
//! - [`KnowledgeBase`]: conditions and result-type explanations, loaded once
//! - [`Retriever`]: substring keyword retrieval into prompt context
//! - [`rag`]: generation with fallback and the [`ChatService`] glue

pub mod loader;
pub mod rag;
pub mod retrieval;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use rag::{ChatResult, ChatService, Generation, GenerationOrigin, Generator};
pub use retrieval::{RetrievalResult, Retriever, NO_INFORMATION};
pub use types::{ConditionRecord, KnowledgeBase, ResultType, ResultTypeCatalog, RiskLevel};
