//! Loading and validating the knowledge file.

use crate::types::KnowledgeBase;
use companion_core::{AppError, AppResult};
use std::collections::HashSet;
use std::path::Path;

impl KnowledgeBase {
    /// Load the knowledge base from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Any failure here is fatal: the service must not start without its
    /// knowledge base.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::Knowledge(format!(
                "Knowledge file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;

        let base = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
        .map_err(|e| AppError::Knowledge(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            "Loaded knowledge base from {:?}: {} conditions",
            path,
            base.conditions.len()
        );

        Ok(base)
    }

    /// Parse and normalize a JSON knowledge document.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        let base: KnowledgeBase = serde_json::from_str(content)
            .map_err(|e| AppError::Knowledge(format!("Invalid knowledge JSON: {}", e)))?;
        base.normalized()
    }

    /// Parse and normalize a YAML knowledge document.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let base: KnowledgeBase = serde_yaml::from_str(content)
            .map_err(|e| AppError::Knowledge(format!("Invalid knowledge YAML: {}", e)))?;
        base.normalized()
    }

    /// Lower-case keywords and reject records that could never match or
    /// would match every query.
    fn normalized(mut self) -> AppResult<Self> {
        let mut names = HashSet::new();

        for condition in &mut self.conditions {
            if condition.name.trim().is_empty() {
                return Err(AppError::Knowledge(
                    "Condition with an empty name".to_string(),
                ));
            }

            if !names.insert(condition.name.clone()) {
                return Err(AppError::Knowledge(format!(
                    "Duplicate condition name: {}",
                    condition.name
                )));
            }

            let mut seen = HashSet::new();
            let mut keywords = Vec::with_capacity(condition.keywords.len());
            for keyword in &condition.keywords {
                let keyword = keyword.to_lowercase();
                if keyword.trim().is_empty() {
                    return Err(AppError::Knowledge(format!(
                        "Condition '{}' has an empty keyword",
                        condition.name
                    )));
                }
                if seen.insert(keyword.clone()) {
                    keywords.push(keyword);
                }
            }

            if keywords.is_empty() {
                return Err(AppError::Knowledge(format!(
                    "Condition '{}' has no keywords",
                    condition.name
                )));
            }

            condition.keywords = keywords;
        }

        Ok(self)
    }
}
