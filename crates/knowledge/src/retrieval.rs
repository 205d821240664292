//! Keyword retrieval over the knowledge base.

use crate::types::{KnowledgeBase, ResultType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Context used when nothing in the query matched.
pub const NO_INFORMATION: &str = "No relevant information found";

/// Result-type phrases, checked in order; the first one found wins.
pub static RESULT_TYPE_RULES: &[(&str, ResultType)] = &[
    ("low risk", ResultType::LowRisk),
    ("high risk", ResultType::HighRisk),
    ("carrier", ResultType::CarrierPositive),
];

/// Context and matched condition names for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Prompt context, or [`NO_INFORMATION`]
    pub context: String,

    /// Names of matched conditions in knowledge-base order
    pub sources: Vec<String>,
}

impl RetrievalResult {
    pub fn has_matches(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Find the result type a query asks about, if any.
pub fn detect_result_type(lower_query: &str) -> Option<ResultType> {
    RESULT_TYPE_RULES
        .iter()
        .find(|(phrase, _)| lower_query.contains(phrase))
        .map(|(_, result_type)| *result_type)
}

/// Substring keyword retriever.
///
/// Every condition with a keyword contained in the lower-cased query is
/// selected; there is no ranking, tokenization or stemming.
#[derive(Debug, Clone)]
pub struct Retriever {
    knowledge: Arc<KnowledgeBase>,
}

impl Retriever {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Build the prompt context for a query.
    pub fn retrieve(&self, query: &str) -> RetrievalResult {
        let lower = query.to_lowercase();

        let mut blocks = Vec::new();
        let mut sources = Vec::new();

        for condition in &self.knowledge.conditions {
            if condition.matches(&lower) {
                blocks.push(condition.context_block());
                sources.push(condition.name.clone());
            }
        }

        if let Some(result_type) = detect_result_type(&lower) {
            blocks.push(format!(
                "{}: {}",
                result_type.label(),
                self.knowledge.result_types.describe(result_type)
            ));
        }

        tracing::debug!(
            "Retrieved {} conditions, {} context blocks",
            sources.len(),
            blocks.len()
        );

        let context = if blocks.is_empty() {
            NO_INFORMATION.to_string()
        } else {
            blocks.join("\n\n")
        };

        RetrievalResult { context, sources }
    }
}
