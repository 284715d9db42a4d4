use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, error, info, warn};

use super::config::NerModelConfig;
use super::decode::{decode_entities, TokenPrediction};
use super::TARGET_MODEL;
use crate::entity::EntitySpan;
use crate::error::{NerError, Result};
use crate::pipeline::EntityRecognizer;

#[derive(Deserialize)]
struct LabelConfig {
    id2label: HashMap<String, String>,
}

/// Read the `id2label` table of a HuggingFace `config.json` into an id-indexed list.
pub fn parse_labels(config_json: &str) -> Result<Vec<String>> {
    let config: LabelConfig = serde_json::from_str(config_json)
        .map_err(|e| NerError::Model(format!("config.json has no usable id2label: {}", e)))?;

    let mut labels = vec![None; config.id2label.len()];
    for (id, label) in config.id2label {
        let index: usize = id
            .parse()
            .map_err(|_| NerError::Model(format!("Non-numeric label id '{}'", id)))?;
        let slot = labels
            .get_mut(index)
            .ok_or_else(|| NerError::Model(format!("Label id {} out of range", index)))?;
        *slot = Some(label);
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| label.ok_or_else(|| NerError::Model(format!("Missing label id {}", i))))
        .collect()
}

/// BERT encoder with a linear token-classification head.
pub struct BertTokenClassifier {
    bert: BertModel,
    classifier: Linear,
    labels: Vec<String>,
    device: Device,
}

impl BertTokenClassifier {
    pub fn load(config: &NerModelConfig) -> Result<Self> {
        info!(target: TARGET_MODEL, "Starting to load NER model from {}", config.model_dir.display());

        let config_path = config.config_path();
        let raw = fs::read_to_string(&config_path).map_err(|e| NerError::from_io(&config_path, e))?;
        let bert_config: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| NerError::Model(format!("Invalid BERT config: {}", e)))?;
        let labels = parse_labels(&raw)?;

        let weights_path = config.weights_path();
        let tensors = match candle_core::safetensors::load(&weights_path, &config.device) {
            Ok(t) => t,
            Err(e) => {
                error!(target: TARGET_MODEL, "!!! Failed to load model tensors: {}", e);
                return Err(e.into());
            }
        };
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &config.device);

        let bert = match BertModel::load(vb.clone(), &bert_config) {
            Ok(m) => m,
            Err(e) => {
                error!(target: TARGET_MODEL, "!!! Failed to load BERT encoder: {}", e);
                return Err(e.into());
            }
        };
        let classifier =
            candle_nn::linear(bert_config.hidden_size, labels.len(), vb.pp("classifier"))?;

        info!(
            target: TARGET_MODEL,
            "Successfully loaded NER model with {} labels: {}",
            labels.len(),
            labels.join(", ")
        );

        Ok(Self {
            bert,
            classifier,
            labels,
            device: config.device.clone(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Most likely label id for every input token.
    pub fn predict(&self, input_ids: &[u32]) -> Result<Vec<usize>> {
        let input_ids = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = input_ids.ones_like()?;

        let hidden_state = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.classifier.forward(&hidden_state)?;
        debug!(target: TARGET_MODEL, "Shape of logits: {:?}", logits.shape());

        let ids = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;
        Ok(ids.into_iter().map(|id| id as usize).collect())
    }
}

/// Statistical stage backed by a BERT token-classification checkpoint.
pub struct BertRecognizer {
    model: BertTokenClassifier,
    tokenizer: Tokenizer,
    max_length: usize,
}

impl BertRecognizer {
    /// Load tokenizer and weights from an existing model directory.
    pub fn load(config: &NerModelConfig) -> Result<Self> {
        let model = BertTokenClassifier::load(config)?;
        let tokenizer = load_tokenizer(&config.tokenizer_path())?;
        Ok(Self {
            model,
            tokenizer,
            max_length: config.max_length,
        })
    }

    /// Fetch missing checkpoint files, then load.
    pub async fn from_config(config: &NerModelConfig) -> Result<Self> {
        config.ensure_models_exist().await?;
        Self::load(config)
    }
}

fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    info!(target: TARGET_MODEL, "Starting to load tokenizer from {}", path.display());
    Tokenizer::from_file(path).map_err(|e| {
        error!(target: TARGET_MODEL, "!!! Failed to load tokenizer: {}", e);
        NerError::Model(format!("Failed to load tokenizer: {}", e))
    })
}

/// Number of leading tokens to feed the model; the rest of the input is dropped.
fn token_budget(total: usize, max_length: usize) -> usize {
    let len = total.min(max_length);
    if len < total {
        warn!(
            target: TARGET_MODEL,
            "Input of {} tokens truncated to {}", total, len
        );
    }
    len
}

impl EntityRecognizer for BertRecognizer {
    fn name(&self) -> &str {
        "bert"
    }

    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let start_time = Instant::now();
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| NerError::Model(format!("Tokenization failed: {}", e)))?;

        let len = token_budget(encoding.len(), self.max_length);

        let label_ids = self.model.predict(&encoding.get_ids()[..len])?;
        let labels = self.model.labels();

        let predictions: Vec<TokenPrediction<'_>> = label_ids
            .iter()
            .zip(encoding.get_word_ids())
            .zip(encoding.get_offsets())
            .map(|((&label_id, &word), &(start, end))| TokenPrediction {
                word,
                start,
                end,
                label: labels.get(label_id).map_or("O", String::as_str),
            })
            .collect();

        let spans = decode_entities(text, &predictions);
        debug!(
            target: TARGET_MODEL,
            "Recognized {} entities in {} tokens ({:?})",
            spans.len(),
            len,
            start_time.elapsed()
        );
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_orders_by_id() {
        let json = r#"{"id2label": {"2": "I-MISC", "0": "O", "1": "B-MISC"}, "hidden_size": 8}"#;
        assert_eq!(parse_labels(json).unwrap(), vec!["O", "B-MISC", "I-MISC"]);
    }

    #[test]
    fn test_token_budget_truncates_long_input() {
        assert_eq!(token_budget(10, 512), 10);
        assert_eq!(token_budget(512, 512), 512);
        assert_eq!(token_budget(700, 512), 512);
    }

    #[test]
    fn test_parse_labels_rejects_gaps() {
        let json = r#"{"id2label": {"0": "O", "2": "B-PER"}}"#;
        assert!(parse_labels(json).is_err());
    }

    #[test]
    fn test_parse_labels_requires_table() {
        assert!(parse_labels(r#"{"hidden_size": 8}"#).is_err());
    }
}
