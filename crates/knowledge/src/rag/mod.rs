//! Retrieval-augmented answering for patient chat.
//!
//! Retrieve, build the prompt, generate (or fall back), then filter.

pub mod chat;
pub mod generate;
pub mod types;

pub use chat::ChatService;
pub use generate::{
    fallback_response, FallbackReason, Generation, GenerationOrigin, Generator,
    FALLBACK_CONFIDENCE, MODEL_CONFIDENCE_WITHOUT_SOURCES, MODEL_CONFIDENCE_WITH_SOURCES,
};
pub use types::ChatResult;
