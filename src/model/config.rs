use candle_core::Device;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{NerError, Result};
use crate::model::TARGET_MODEL;

pub const MODEL_DIR_ENV: &str = "NER_MODEL_DIR";
pub const MODEL_REPO_ENV: &str = "NER_MODEL_REPO";
pub const MAX_LENGTH_ENV: &str = "NER_MAX_LENGTH";

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Location and limits of the token-classification checkpoint
#[derive(Debug, Clone)]
pub struct NerModelConfig {
    pub model_dir: PathBuf,
    pub repo: String,
    pub max_length: usize,
    pub device: Device,
}

impl Default for NerModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/bert-base-NER"),
            repo: "dslim/bert-base-NER".to_string(),
            max_length: 512,
            device: Device::Cpu,
        }
    }
}

/// A usable token budget fits at least the two special tokens.
fn parse_max_length(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse().ok())
        .filter(|&len: &usize| len > 1)
}

impl NerModelConfig {
    /// Defaults overridden by `NER_MODEL_DIR`, `NER_MODEL_REPO` and `NER_MAX_LENGTH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_dir: env::var(MODEL_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            repo: env::var(MODEL_REPO_ENV).unwrap_or(defaults.repo),
            max_length: parse_max_length(env::var(MAX_LENGTH_ENV).ok().as_deref())
                .unwrap_or(defaults.max_length),
            device: defaults.device,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join(CONFIG_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(WEIGHTS_FILE)
    }

    pub fn file_url(&self, file: &str) -> String {
        format!("https://huggingface.co/{}/resolve/main/{}", self.repo, file)
    }

    /// Download any checkpoint file missing from `model_dir`.
    pub async fn ensure_models_exist(&self) -> Result<()> {
        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir)
                .await
                .map_err(|e| NerError::from_io(&self.model_dir, e))?;
        }

        for file in [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE] {
            let path = self.model_dir.join(file);
            if !path.exists() {
                self.download(file, &path).await?;
            }
        }

        Ok(())
    }

    async fn download(&self, file: &str, path: &Path) -> Result<()> {
        let url = self.file_url(file);
        info!(target: TARGET_MODEL, "Downloading {} from {}", file, url);

        let download_err = |source| NerError::Download {
            url: url.clone(),
            source,
        };
        let response = reqwest::get(&url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_err)?;
        let bytes = response.bytes().await.map_err(download_err)?;

        fs::write(path, bytes)
            .await
            .map_err(|e| NerError::from_io(path, e))?;
        info!(target: TARGET_MODEL, "Downloaded {} to {}", file, path.display());
        Ok(())
    }
}
