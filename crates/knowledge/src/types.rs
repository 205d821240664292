//! Knowledge base types.

use serde::{Deserialize, Serialize};

/// Coarse severity tag carried by some conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One screened condition in the curated knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// Display name, unique within the knowledge base
    pub name: String,

    pub description: String,

    pub inheritance: String,

    pub frequency: String,

    /// Short facts, in presentation order
    #[serde(default)]
    pub key_facts: Vec<String>,

    /// Lower-case phrases that select this record when found in a query
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl ConditionRecord {
    /// Whether any keyword occurs in the (already lower-cased) query.
    pub fn matches(&self, lower_query: &str) -> bool {
        self.keywords.iter().any(|kw| lower_query.contains(kw.as_str()))
    }

    /// Render the record as one context block for the prompt.
    pub fn context_block(&self) -> String {
        let mut block = format!(
            "**{}**\nDescription: {}\nInheritance: {}\nFrequency: {}",
            self.name, self.description, self.inheritance, self.frequency
        );

        if !self.key_facts.is_empty() {
            block.push_str("\nKey Facts:");
            for fact in &self.key_facts {
                block.push_str("\n- ");
                block.push_str(fact);
            }
        }

        block
    }
}

/// The result categories a screening report can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    LowRisk,
    HighRisk,
    CarrierPositive,
}

impl ResultType {
    /// Heading used when the explanation is added to the prompt context.
    pub fn label(&self) -> &'static str {
        match self {
            ResultType::LowRisk => "Low Risk Result",
            ResultType::HighRisk => "High Risk Result",
            ResultType::CarrierPositive => "Carrier Status",
        }
    }
}

/// Plain-language explanations of each result type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTypeCatalog {
    pub low_risk: String,
    pub high_risk: String,
    pub carrier_positive: String,
}

impl ResultTypeCatalog {
    pub fn describe(&self, result_type: ResultType) -> &str {
        match result_type {
            ResultType::LowRisk => &self.low_risk,
            ResultType::HighRisk => &self.high_risk,
            ResultType::CarrierPositive => &self.carrier_positive,
        }
    }
}

/// The curated knowledge base: conditions in file order plus result-type
/// explanations. Loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,

    pub result_types: ResultTypeCatalog,
}

impl KnowledgeBase {
    /// Look up a condition by exact name.
    pub fn condition(&self, name: &str) -> Option<&ConditionRecord> {
        self.conditions.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ConditionRecord {
        ConditionRecord {
            name: "Cystic Fibrosis".to_string(),
            description: "Affects lungs".to_string(),
            inheritance: "Autosomal recessive".to_string(),
            frequency: "1 in 2,500".to_string(),
            key_facts: vec!["Carriers are healthy".to_string(), "Treatable".to_string()],
            keywords: vec!["cystic fibrosis".to_string(), "cftr".to_string()],
            risk_level: Some(RiskLevel::Medium),
        }
    }

    #[test]
    fn test_context_block_layout() {
        assert_eq!(
            record().context_block(),
            "**Cystic Fibrosis**\n\
             Description: Affects lungs\n\
             Inheritance: Autosomal recessive\n\
             Frequency: 1 in 2,500\n\
             Key Facts:\n\
             - Carriers are healthy\n\
             - Treatable"
        );
    }

    #[test]
    fn test_context_block_without_facts() {
        let mut record = record();
        record.key_facts.clear();
        assert!(record.context_block().ends_with("Frequency: 1 in 2,500"));
    }

    #[test]
    fn test_matches_is_substring_containment() {
        let record = record();
        assert!(record.matches("what is cystic fibrosis?"));
        assert!(record.matches("my cftr variant"));
        assert!(!record.matches("what is sma?"));
    }

    #[test]
    fn test_risk_level_serde() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: RiskLevel = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, RiskLevel::Low);
        assert_eq!(parsed.as_str(), "low");
    }

    #[test]
    fn test_catalog_describe() {
        let catalog = ResultTypeCatalog {
            low_risk: "low".to_string(),
            high_risk: "high".to_string(),
            carrier_positive: "carrier".to_string(),
        };
        assert_eq!(catalog.describe(ResultType::HighRisk), "high");
        assert_eq!(ResultType::CarrierPositive.label(), "Carrier Status");
    }
}
