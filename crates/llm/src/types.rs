//! Provider identification.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    Ollama,
}

impl ProviderType {
    /// Every provider, in the order of `companion_core::config::KNOWN_PROVIDERS`.
    pub const ALL: [ProviderType; 2] = [Self::Gemini, Self::Ollama];

    /// Parse provider type from its canonical name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let name = s.to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    /// Whether the provider cannot be reached without a credential.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Endpoint used when the configuration names none.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}
