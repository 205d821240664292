//! Chat pipeline result types.

use serde::{Deserialize, Serialize};

/// The answer returned for one chat request.
///
/// `confidence` is a coarse signal from retrieval and generation outcome,
/// not a calibrated probability. `should_escalate` is computed from the
/// patient's message alone and is never cleared by a successful answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Safety-filtered answer text
    pub response: String,

    /// 0.85, 0.5 or 0.4 depending on matches and generation outcome
    pub confidence: f32,

    /// Whether the conversation should go to a human counselor
    pub should_escalate: bool,

    /// Matched condition names in knowledge-base order
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_result_wire_shape() {
        let result = ChatResult {
            response: "Answer".to_string(),
            confidence: 0.85,
            should_escalate: true,
            sources: vec!["Cystic Fibrosis".to_string()],
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["response"], "Answer");
        assert_eq!(value["should_escalate"], true);
        assert_eq!(value["sources"][0], "Cystic Fibrosis");
        assert!((value["confidence"].as_f64().unwrap() - 0.85).abs() < 1e-6);
    }
}
