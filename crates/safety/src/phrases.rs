//! Phrase lists and canned responses used by the safety filter.
//!
//! All phrases are lower-case; inputs are lower-cased before matching.

/// Messages containing any of these are flagged for a human counselor.
pub static ESCALATION_PHRASES: &[&str] = &[
    "speak to someone",
    "talk to a counselor",
    "very worried",
    "scared",
    "don't understand my results",
    "high risk",
    "what should i do",
    "terminate",
    "abortion",
    "ending pregnancy",
];

/// Overconfident or directive wording that must never reach a patient.
pub static BLOCKED_PHRASES: &[&str] = &[
    "you should terminate",
    "you should abort",
    "i recommend you",
    "you must",
    "definitely will have",
    "your baby will have",
    "guaranteed",
    "100%",
];

/// Wording that makes a response medical enough to need a disclaimer.
pub static MEDICAL_KEYWORDS: &[&str] = &[
    "risk",
    "diagnosis",
    "condition",
    "syndrome",
    "disease",
    "treatment",
    "therapy",
    "test result",
];

/// A response that already mentions this needs no disclaimer.
pub const COUNSELOR_MENTION: &str = "genetic counselor";

/// Replaces any response containing a blocked phrase.
pub const SAFE_DEFLECTION: &str = "I want to help, but I need to be careful not to overstep. \
A genetic counselor can provide the specific guidance you need. \
Would you like help scheduling a consultation?";

/// Appended to medical responses that do not mention a genetic counselor.
pub const MEDICAL_DISCLAIMER: &str =
    "\n\n*For personalized medical advice, please consult with a genetic counselor.*";

/// Contact details offered when a conversation is escalated.
pub const ESCALATION_RESPONSE: &str = "I understand this may be a difficult time. I strongly recommend \
speaking with one of our licensed genetic counselors who can provide \
personalized guidance.\n\n\
📞 Schedule: unityscreen.com/schedule-a-consult\n\
📧 Email: support@unityscreen.com\n\
☎️ Call: 650-460-2551";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_lists_are_lower_case() {
        for phrase in ESCALATION_PHRASES
            .iter()
            .chain(BLOCKED_PHRASES)
            .chain(MEDICAL_KEYWORDS)
        {
            assert_eq!(*phrase, phrase.to_lowercase(), "{phrase} must be lower-case");
        }
    }

    #[test]
    fn test_canned_responses_never_trip_the_block_list() {
        for text in [SAFE_DEFLECTION, ESCALATION_RESPONSE] {
            let lower = text.to_lowercase();
            assert!(BLOCKED_PHRASES.iter().all(|p| !lower.contains(p)));
        }
    }
}
