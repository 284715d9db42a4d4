use tracing::debug;

use super::rules::{validate_rules, OverrideRule};
use super::tokenize::{tokenize, TextToken};
use super::types::{EntityLabel, EntitySource, EntitySpan};
use super::TARGET_ENTITY;
use crate::error::Result;

/// A rule with its pattern already split into tokens.
#[derive(Debug, Clone)]
struct CompiledRule {
    tokens: Vec<String>,
    label: EntityLabel,
}

/// Literal-match stage that runs ahead of the statistical recognizer.
///
/// Patterns are matched token by token, so "Tesla" matches in "Tesla's" and
/// "Tesla," but not inside "Teslas". Registered matches always win over the
/// model for the spans they cover. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct EntityRuler {
    rules: Vec<CompiledRule>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    first_token: usize,
    token_len: usize,
    rule: usize,
}

impl EntityRuler {
    /// Validate and compile `rules` for case-sensitive matching.
    pub fn new(rules: &[OverrideRule]) -> Result<Self> {
        Self::build(rules, false)
    }

    /// Validate and compile `rules` for case-insensitive matching.
    pub fn case_insensitive(rules: &[OverrideRule]) -> Result<Self> {
        Self::build(rules, true)
    }

    fn build(rules: &[OverrideRule], case_insensitive: bool) -> Result<Self> {
        validate_rules(rules)?;

        let compiled = rules
            .iter()
            .map(|rule| CompiledRule {
                tokens: tokenize(&rule.pattern)
                    .into_iter()
                    .map(|t| fold_case(t.text, case_insensitive))
                    .collect(),
                label: EntityLabel::from(rule.label.as_str()),
            })
            .collect::<Vec<_>>();

        debug!(
            target: TARGET_ENTITY,
            "Compiled {} override rules (case_insensitive={})",
            compiled.len(),
            case_insensitive
        );

        Ok(EntityRuler {
            rules: compiled,
            case_insensitive,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// All non-overlapping rule matches in `text`, ordered by position.
    ///
    /// Where matches overlap, the one covering more tokens wins, then the
    /// earlier one, then the rule registered first.
    pub fn find_matches(&self, text: &str) -> Vec<EntitySpan> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let tokens = tokenize(text);
        let folded: Vec<String> = tokens
            .iter()
            .map(|t| fold_case(t.text, self.case_insensitive))
            .collect();

        let mut candidates = Vec::new();
        for first_token in 0..folded.len() {
            for (rule, compiled) in self.rules.iter().enumerate() {
                let token_len = compiled.tokens.len();
                if token_len == 0 || first_token + token_len > folded.len() {
                    continue;
                }
                if folded[first_token..first_token + token_len] == compiled.tokens[..] {
                    candidates.push(Candidate {
                        first_token,
                        token_len,
                        rule,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.token_len
                .cmp(&a.token_len)
                .then(a.first_token.cmp(&b.first_token))
                .then(a.rule.cmp(&b.rule))
        });

        let mut claimed = vec![false; tokens.len()];
        let mut spans = Vec::new();
        for candidate in candidates {
            let range = candidate.first_token..candidate.first_token + candidate.token_len;
            if claimed[range.clone()].iter().any(|&c| c) {
                continue;
            }
            claimed[range.clone()].iter_mut().for_each(|c| *c = true);
            spans.push(self.span_for(text, &tokens[range], candidate.rule));
        }

        spans.sort_by_key(|s| s.start);
        spans
    }

    fn span_for(&self, text: &str, matched: &[TextToken<'_>], rule: usize) -> EntitySpan {
        let start = matched.first().map_or(0, |t| t.start);
        let end = matched.last().map_or(start, |t| t.end);
        EntitySpan::new(
            text,
            start,
            end,
            self.rules[rule].label.clone(),
            EntitySource::Ruler,
        )
    }
}

fn fold_case(token: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        token.to_lowercase()
    } else {
        token.to_string()
    }
}
