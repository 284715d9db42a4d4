//! Entity recognition pipeline
//!
//! Text goes through two stages: the [`EntityRuler`] with its literal
//! override rules, then the statistical [`EntityRecognizer`]. Ruler matches
//! are kept as-is and model spans that touch any of them are discarded, so a
//! registered pattern always decides the label of the text it covers.
//!
//! One pipeline per process is installed with [`init_global`] at startup and
//! shared read-only through [`global`].

pub mod recognizer;

pub use recognizer::{EntityRecognizer, NullRecognizer};

use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::entity::{Doc, EntityRuler, EntitySource, EntitySpan};
use crate::error::{NerError, Result};

pub const TARGET_PIPELINE: &str = "ner_pipeline";

static PIPELINE: OnceLock<Arc<Pipeline>> = OnceLock::new();

pub struct Pipeline {
    ruler: EntityRuler,
    recognizer: Box<dyn EntityRecognizer>,
}

impl Pipeline {
    pub fn new(ruler: EntityRuler, recognizer: Box<dyn EntityRecognizer>) -> Self {
        info!(
            target: TARGET_PIPELINE,
            "Pipeline ready: {} override rules ahead of '{}' recognizer",
            ruler.len(),
            recognizer.name()
        );
        Self { ruler, recognizer }
    }

    /// Pipeline with override rules only.
    pub fn ruler_only(ruler: EntityRuler) -> Self {
        Self::new(ruler, Box::new(NullRecognizer))
    }

    pub fn ruler(&self) -> &EntityRuler {
        &self.ruler
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Run both stages over `text`.
    pub fn process(&self, text: &str) -> Result<Doc> {
        let overrides = self.ruler.find_matches(text);
        let predicted = if text.trim().is_empty() {
            Vec::new()
        } else {
            self.recognizer.recognize(text)?
        };

        let ents = merge_spans(overrides, predicted);
        debug!(
            target: TARGET_PIPELINE,
            "Processed {} bytes: {} entities", text.len(), ents.len()
        );
        Ok(Doc::new(text, ents))
    }
}

/// Keep every override span, add model spans that overlap neither an override nor each other.
fn merge_spans(overrides: Vec<EntitySpan>, predicted: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let mut merged = overrides;

    for span in predicted {
        if span.is_empty() {
            continue;
        }
        if let Some(kept) = merged.iter().find(|kept| kept.overlaps(&span)) {
            if kept.source == EntitySource::Ruler {
                debug!(
                    target: TARGET_PIPELINE,
                    "Override '{}' ({}) wins over model span '{}' ({})",
                    kept.text, kept.label, span.text, span.label
                );
            }
            continue;
        }
        merged.push(span);
    }

    merged.sort_by_key(|s| (s.start, s.end));
    merged
}

/// Install the process-wide pipeline. Fails if one is already installed.
pub fn init_global(pipeline: Pipeline) -> Result<Arc<Pipeline>> {
    let pipeline = Arc::new(pipeline);
    PIPELINE
        .set(Arc::clone(&pipeline))
        .map_err(|_| NerError::AlreadyInitialized)?;
    Ok(pipeline)
}

/// The process-wide pipeline, if initialized.
pub fn global() -> Result<Arc<Pipeline>> {
    PIPELINE
        .get()
        .ok_or(NerError::NotInitialized)
        .map(Arc::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityLabel, OverrideRule, RuleSet};

    /// Labels fixed substrings, standing in for a statistical model.
    struct StubRecognizer(Vec<(&'static str, &'static str)>);

    impl EntityRecognizer for StubRecognizer {
        fn name(&self) -> &str {
            "stub"
        }

        fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
            let mut spans = Vec::new();
            for (needle, label) in &self.0 {
                for (start, _) in text.match_indices(needle) {
                    spans.push(EntitySpan::new(
                        text,
                        start,
                        start + needle.len(),
                        EntityLabel::from(*label),
                        EntitySource::Model,
                    ));
                }
            }
            Ok(spans)
        }
    }

    fn pipeline(rules: &[OverrideRule], model: Vec<(&'static str, &'static str)>) -> Pipeline {
        Pipeline::new(
            EntityRuler::new(rules).unwrap(),
            Box::new(StubRecognizer(model)),
        )
    }

    #[test]
    fn test_override_beats_model_label() {
        let pipeline = pipeline(
            &[OverrideRule::new("Tesla", "ORG")],
            vec![("Tesla", "PERSON"), ("Berlin", "GPE")],
        );
        let doc = pipeline.process("Tesla opened a plant in Berlin").unwrap();
        assert_eq!(
            doc.entity_pairs(),
            vec![
                ("Tesla".to_string(), "ORG".to_string()),
                ("Berlin".to_string(), "GPE".to_string())
            ]
        );
        assert_eq!(doc.ents[0].source, EntitySource::Ruler);
        assert_eq!(doc.ents[1].source, EntitySource::Model);
    }

    #[test]
    fn test_partially_overlapping_model_span_is_dropped() {
        let pipeline = pipeline(
            &[OverrideRule::new("Elon Musk", "PERSON")],
            vec![("Musk Foundation", "ORG")],
        );
        let doc = pipeline.process("Elon Musk Foundation").unwrap();
        assert_eq!(
            doc.entity_pairs(),
            vec![("Elon Musk".to_string(), "PERSON".to_string())]
        );
    }

    #[test]
    fn test_overlapping_model_spans_keep_first() {
        let pipeline = pipeline(&[], vec![("New York", "GPE"), ("York City", "GPE")]);
        let doc = pipeline.process("New York City").unwrap();
        assert_eq!(doc.ents.len(), 1);
        assert_eq!(doc.ents[0].text, "New York");
    }

    #[test]
    fn test_ruler_only_pipeline() {
        let pipeline = Pipeline::ruler_only(EntityRuler::new(&RuleSet::Ai.rules()).unwrap());
        let doc = pipeline.process("OpenAI released ChatGPT").unwrap();
        assert_eq!(
            doc.entity_pairs(),
            vec![
                ("OpenAI".to_string(), "ORG".to_string()),
                ("ChatGPT".to_string(), "PRODUCT".to_string())
            ]
        );
        assert_eq!(pipeline.recognizer_name(), "none");
    }

    #[test]
    fn test_blank_text_skips_recognizer() {
        let pipeline = pipeline(&[], vec![(" ", "MISC")]);
        let doc = pipeline.process("   ").unwrap();
        assert!(!doc.has_entities());
    }

    #[test]
    fn test_global_is_set_once() {
        // Other tests in this binary may have installed it first
        let _ = init_global(Pipeline::ruler_only(EntityRuler::default()));
        let installed = global().unwrap();
        assert!(matches!(
            init_global(Pipeline::ruler_only(EntityRuler::default())),
            Err(NerError::AlreadyInitialized)
        ));
        assert!(Arc::ptr_eq(&installed, &global().unwrap()));
    }
}
