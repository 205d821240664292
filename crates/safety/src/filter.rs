//! Post-generation safety filter and escalation check.

use crate::phrases::{
    BLOCKED_PHRASES, COUNSELOR_MENTION, ESCALATION_PHRASES, ESCALATION_RESPONSE,
    MEDICAL_DISCLAIMER, MEDICAL_KEYWORDS, SAFE_DEFLECTION,
};

/// What the filter did to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Returned unchanged
    Clean,
    /// Disclaimer appended
    Disclaimed,
    /// Replaced by the deflection because of the given phrase
    Blocked { phrase: &'static str },
}

/// A filtered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub text: String,
    pub verdict: Verdict,
}

/// Safety guardrails applied around generation.
///
/// Matching is plain case-insensitive substring containment, so "scared"
/// also fires inside "I am not scared". Stateless; copy freely.
#[derive(Debug, Clone, Copy)]
pub struct SafetyFilter {
    escalation_phrases: &'static [&'static str],
    blocked_phrases: &'static [&'static str],
    medical_keywords: &'static [&'static str],
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyFilter {
    /// Create a filter over the standard phrase lists.
    pub fn new() -> Self {
        Self {
            escalation_phrases: ESCALATION_PHRASES,
            blocked_phrases: BLOCKED_PHRASES,
            medical_keywords: MEDICAL_KEYWORDS,
        }
    }

    /// Whether the patient's message should be routed to a human counselor.
    pub fn should_escalate(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        let escalate = self
            .escalation_phrases
            .iter()
            .any(|phrase| lower.contains(phrase));

        if escalate {
            tracing::info!("Message flagged for counselor escalation");
        }

        escalate
    }

    /// Filter a generated response, returning the text to show the patient.
    pub fn validate(&self, response: &str) -> String {
        self.inspect(response).text
    }

    /// Filter a generated response and report what was done.
    ///
    /// A blocked phrase discards the whole response. Otherwise a response with
    /// medical wording gets a disclaimer unless it already mentions a genetic
    /// counselor.
    pub fn inspect(&self, response: &str) -> Validation {
        let lower = response.to_lowercase();

        if let Some(phrase) = self.blocked_phrase(&lower) {
            tracing::warn!(phrase, "Blocked phrase detected, response replaced");
            return Validation {
                text: SAFE_DEFLECTION.to_string(),
                verdict: Verdict::Blocked { phrase },
            };
        }

        if self.contains_medical_content(&lower) && !lower.contains(COUNSELOR_MENTION) {
            return Validation {
                text: format!("{}{}", response, MEDICAL_DISCLAIMER),
                verdict: Verdict::Disclaimed,
            };
        }

        Validation {
            text: response.to_string(),
            verdict: Verdict::Clean,
        }
    }

    /// Counselor contact block shown alongside escalated conversations.
    pub fn escalation_response(&self) -> &'static str {
        ESCALATION_RESPONSE
    }

    fn blocked_phrase(&self, lower: &str) -> Option<&'static str> {
        self.blocked_phrases
            .iter()
            .copied()
            .find(|phrase| lower.contains(phrase))
    }

    fn contains_medical_content(&self, lower: &str) -> bool {
        self.medical_keywords.iter().any(|kw| lower.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalates_on_worry() {
        let filter = SafetyFilter::new();
        assert!(filter.should_escalate("I'm scared and don't understand my results"));
        assert!(filter.should_escalate("My result says HIGH RISK for trisomy 21"));
        assert!(filter.should_escalate("What should I do now?"));
    }

    #[test]
    fn test_routine_question_does_not_escalate() {
        let filter = SafetyFilter::new();
        assert!(!filter.should_escalate("What time is my appointment?"));
        assert!(!filter.should_escalate(""));
    }

    #[test]
    fn test_negation_still_escalates() {
        // Substring semantics: negation is not understood
        assert!(SafetyFilter::new().should_escalate("I am NOT scared"));
    }

    #[test]
    fn test_blocked_phrase_replaces_whole_response() {
        let filter = SafetyFilter::new();
        assert_eq!(
            filter.validate("You must terminate the pregnancy"),
            SAFE_DEFLECTION
        );
        assert_eq!(
            filter.validate("Lots of careful context here. It is GUARANTEED to be fine."),
            SAFE_DEFLECTION
        );
    }

    #[test]
    fn test_first_blocked_phrase_is_reported() {
        let validation = SafetyFilter::new().inspect("You should abort; you must. 100%");
        assert_eq!(
            validation.verdict,
            Verdict::Blocked {
                phrase: "you should abort"
            }
        );
    }

    #[test]
    fn test_existing_counselor_mention_skips_disclaimer() {
        let text = "This condition carries a genetic counselor recommendation already";
        let validation = SafetyFilter::new().inspect(text);
        assert_eq!(validation.text, text);
        assert_eq!(validation.verdict, Verdict::Clean);
    }

    #[test]
    fn test_counselor_mention_is_case_insensitive() {
        let text = "Ask a Genetic Counselor about this syndrome.";
        assert_eq!(SafetyFilter::new().validate(text), text);
    }

    #[test]
    fn test_medical_content_gets_disclaimer() {
        let text = "This is a common condition with low frequency";
        let validation = SafetyFilter::new().inspect(text);
        assert_eq!(validation.text, format!("{}{}", text, MEDICAL_DISCLAIMER));
        assert_eq!(validation.verdict, Verdict::Disclaimed);
    }

    #[test]
    fn test_non_medical_text_is_unchanged() {
        let text = "Your appointment is on Tuesday.";
        assert_eq!(SafetyFilter::new().validate(text), text);
    }

    #[test]
    fn test_escalation_response_has_contact_details() {
        let contact = SafetyFilter::new().escalation_response();
        assert!(contact.contains("unityscreen.com/schedule-a-consult"));
        assert!(contact.contains("650-460-2551"));
    }
}
