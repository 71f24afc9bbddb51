//! Mapping document sources to channel labels.
//!
//! Rules are checked in the order they are configured; the first rule whose
//! key occurs in the source identifier decides the label.

use serde::{Deserialize, Serialize};

/// One `key → label` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Substring looked for in the source identifier.
    pub key: String,
    /// Canonical channel label reported for matching sources.
    pub label: String,
}

impl CategoryRule {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Ordered classifier over [`CategoryRule`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Label for `source`; the source itself when no rule matches.
    pub fn classify(&self, source: &str) -> String {
        self.rules
            .iter()
            .find(|rule| source.contains(rule.key.as_str()))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| source.to_string())
    }
}

/// The five channels of the Taiwan Affairs Office press site.
pub fn default_rules() -> Vec<CategoryRule> {
    ["台辦動態", "交流交往", "政務要聞", "部門涉台", "新聞發佈"]
        .into_iter()
        .map(|name| CategoryRule::new(name, name))
        .collect()
}
