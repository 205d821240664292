//! Safety guardrails for the Unity Companion backend.
//!
//! - Escalation: flags patient messages that warrant a human counselor
//! - Validation: replaces directive or overconfident answers with a safe
//!   deflection and adds a disclaimer to medical answers

pub mod filter;
pub mod phrases;

pub use filter::{SafetyFilter, Validation, Verdict};
pub use phrases::{ESCALATION_RESPONSE, MEDICAL_DISCLAIMER, SAFE_DEFLECTION};
