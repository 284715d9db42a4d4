use crate::entity::EntitySpan;
use crate::error::Result;

/// Statistical entity recognition stage.
///
/// Implementations return spans over `text` in any order; the pipeline sorts
/// them and resolves conflicts with the override rules.
pub trait EntityRecognizer: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Recognizer that finds nothing, leaving only override matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl EntityRecognizer for NullRecognizer {
    fn name(&self) -> &str {
        "none"
    }

    fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        Ok(Vec::new())
    }
}
