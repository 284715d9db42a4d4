pub mod corpus;
pub mod entity;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod web;

pub use error::{NerError, Result};

use entity::{EntityRuler, OverrideRule};
use model::{BertRecognizer, NerModelConfig};
use pipeline::Pipeline;

/// Options shared by both front-ends for assembling a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub rules: Vec<OverrideRule>,
    pub case_insensitive: bool,
    /// Skip the statistical stage and run override rules only.
    pub ruler_only: bool,
    pub model: NerModelConfig,
}

impl PipelineOptions {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self {
            rules,
            case_insensitive: false,
            ruler_only: false,
            model: NerModelConfig::from_env(),
        }
    }
}

/// Compile the override rules and, unless disabled, load the statistical model.
pub async fn build_pipeline(options: &PipelineOptions) -> Result<Pipeline> {
    let ruler = if options.case_insensitive {
        EntityRuler::case_insensitive(&options.rules)?
    } else {
        EntityRuler::new(&options.rules)?
    };

    if options.ruler_only {
        return Ok(Pipeline::ruler_only(ruler));
    }

    let recognizer = BertRecognizer::from_config(&options.model).await?;
    Ok(Pipeline::new(ruler, Box::new(recognizer)))
}
