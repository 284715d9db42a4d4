// Token-classification model configuration and inference
pub const TARGET_MODEL: &str = "ner_model";

pub mod bert;
pub mod config;
pub mod decode;

pub use bert::{BertRecognizer, BertTokenClassifier};
pub use config::NerModelConfig;
