//! Override rule configuration
//!
//! Rules are literal (pattern, label) pairs. They come from one of the built-in
//! sets or from a JSON file in the pattern-list layout:
//!
//! ```json
//! [{"label": "ORG", "pattern": "Tesla"}, {"label": "PERSON", "pattern": "Elon Musk"}]
//! ```
//!
//! The automotive and AI sets are kept apart on purpose. Each front-end picks
//! its own default and neither is derived from the other.

use clap::ValueEnum;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::TARGET_ENTITY;
use crate::error::{NerError, Result};

/// One literal override: any text span equal to `pattern` is labeled `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub label: String,
    pub pattern: String,
}

impl OverrideRule {
    pub fn new(pattern: &str, label: &str) -> Self {
        OverrideRule {
            label: label.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

impl From<(&str, &str)> for OverrideRule {
    fn from((pattern, label): (&str, &str)) -> Self {
        OverrideRule::new(pattern, label)
    }
}

/// Built-in rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleSet {
    /// StarLink, CyberTruck, Tesla, Elon Musk
    Automotive,
    /// OpenAI, ChatGPT, Tesla, Elon Musk
    Ai,
    /// No overrides
    Empty,
}

lazy_static! {
    static ref AUTOMOTIVE_RULES: Vec<OverrideRule> = vec![
        OverrideRule::new("StarLink", "ORG"),
        OverrideRule::new("CyberTruck", "PRODUCT"),
        OverrideRule::new("Tesla", "ORG"),
        OverrideRule::new("Elon Musk", "PERSON"),
    ];

    static ref AI_RULES: Vec<OverrideRule> = vec![
        OverrideRule::new("OpenAI", "ORG"),
        OverrideRule::new("ChatGPT", "PRODUCT"),
        OverrideRule::new("Tesla", "ORG"),
        OverrideRule::new("Elon Musk", "PERSON"),
    ];
}

impl RuleSet {
    pub fn rules(self) -> Vec<OverrideRule> {
        match self {
            RuleSet::Automotive => AUTOMOTIVE_RULES.clone(),
            RuleSet::Ai => AI_RULES.clone(),
            RuleSet::Empty => Vec::new(),
        }
    }
}

/// Reject rules whose pattern or label is blank.
pub fn validate_rules(rules: &[OverrideRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.pattern.trim().is_empty() {
            return Err(NerError::InvalidRule {
                index,
                reason: "pattern is empty".to_string(),
            });
        }
        if rule.label.trim().is_empty() {
            return Err(NerError::InvalidRule {
                index,
                reason: format!("label is empty for pattern '{}'", rule.pattern),
            });
        }
    }
    Ok(())
}

/// Read and validate a JSON rules file.
pub fn load_rules_file(path: impl AsRef<Path>) -> Result<Vec<OverrideRule>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| NerError::from_io(path, e))?;
    let rules: Vec<OverrideRule> =
        serde_json::from_str(&content).map_err(|source| NerError::RulesFormat {
            path: path.to_path_buf(),
            source,
        })?;
    validate_rules(&rules)?;

    info!(
        target: TARGET_ENTITY,
        "Loaded {} override rules from {}",
        rules.len(),
        path.display()
    );
    Ok(rules)
}

/// Rules from `path` when given, otherwise the built-in `set`.
pub fn resolve_rules(set: RuleSet, path: Option<&Path>) -> Result<Vec<OverrideRule>> {
    match path {
        Some(path) => load_rules_file(path),
        None => Ok(set.rules()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sets_are_distinct() {
        let automotive = RuleSet::Automotive.rules();
        let ai = RuleSet::Ai.rules();
        assert!(automotive.contains(&OverrideRule::new("CyberTruck", "PRODUCT")));
        assert!(!ai.contains(&OverrideRule::new("CyberTruck", "PRODUCT")));
        assert!(ai.contains(&OverrideRule::new("ChatGPT", "PRODUCT")));
        assert!(RuleSet::Empty.rules().is_empty());
        assert!(validate_rules(&automotive).is_ok());
        assert!(validate_rules(&ai).is_ok());
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let rules = vec![OverrideRule::new("Tesla", "ORG"), OverrideRule::new("  ", "ORG")];
        match validate_rules(&rules) {
            Err(NerError::InvalidRule { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_label_is_rejected() {
        let rules = vec![OverrideRule::new("Tesla", "")];
        assert!(matches!(
            validate_rules(&rules),
            Err(NerError::InvalidRule { index: 0, .. })
        ));
    }

    #[test]
    fn test_rules_deserialize_from_pattern_list() {
        let rules: Vec<OverrideRule> =
            serde_json::from_str(r#"[{"label": "ORG", "pattern": "Tesla"}]"#).unwrap();
        assert_eq!(rules, vec![OverrideRule::new("Tesla", "ORG")]);
    }

    #[test]
    fn test_resolve_without_file_uses_builtin() {
        let rules = resolve_rules(RuleSet::Ai, None).unwrap();
        assert_eq!(rules, RuleSet::Ai.rules());
    }
}
