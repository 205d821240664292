//! Cross-module tests for the chat pipeline.

pub(crate) mod mock;
