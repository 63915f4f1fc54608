//! Catalog and local store of Model2Vec embedding models

use crate::error::{Result, ResumeMatcherError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmbeddingModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub repo_id: &'static str,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: &'static str,
}

/// Known models, in preference order for auto-selection.
pub const MODEL_CATALOG: &[EmbeddingModelInfo] = &[
    EmbeddingModelInfo {
        id: "potion-base-8M",
        name: "Potion Base 8M",
        repo_id: "minishlab/potion-base-8M",
        size_mb: 33,
        dimensions: 256,
        description: "Fast static embeddings, the default for match scoring",
    },
    EmbeddingModelInfo {
        id: "m2v-base",
        name: "Model2Vec Base",
        repo_id: "minishlab/M2V_base_output",
        size_mb: 90,
        dimensions: 256,
        description: "Legacy Model2Vec base model",
    },
    EmbeddingModelInfo {
        id: "m2v-large",
        name: "Model2Vec Large",
        repo_id: "minishlab/M2V_large_output",
        size_mb: 250,
        dimensions: 512,
        description: "Larger Model2Vec model for higher recall",
    },
];

const REQUIRED_FILES: &[&str] = &["model.safetensors", "tokenizer.json"];
const OPTIONAL_FILES: &[&str] = &["config.json", "README.md"];

/// Look a model up by catalog id, repo id or display name.
pub fn resolve_model_id(input: &str) -> Option<&'static EmbeddingModelInfo> {
    let input_lower = input.to_lowercase();
    MODEL_CATALOG.iter().find(|m| {
        m.id == input || m.repo_id == input || m.name.to_lowercase() == input_lower
    })
}

/// A directory holds a usable model once the weights and tokenizer are present.
pub fn is_model_directory(path: &Path) -> bool {
    REQUIRED_FILES.iter().all(|f| path.join(f).is_file())
}

pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    downloaded: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await.map_err(|e| {
            ResumeMatcherError::ModelError(format!("Failed to create models directory: {}", e))
        })?;

        let mut manager = Self {
            models_dir,
            downloaded: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ResumeMatcherError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()) {
                self.downloaded.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn list_available_models(&self) -> &'static [EmbeddingModelInfo] {
        MODEL_CATALOG
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded.iter().cloned().collect()
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.is_model_downloaded(model_id).then(|| self.models_dir.join(model_id))
    }

    /// First downloaded model in catalog order, else the catalog default.
    pub fn auto_select_model(&self) -> &'static str {
        MODEL_CATALOG
            .iter()
            .find(|m| self.is_model_downloaded(m.id))
            .unwrap_or(&MODEL_CATALOG[0])
            .id
    }

    /// Fetch a catalog model into the models directory.
    pub async fn download_model(&mut self, model: &str) -> Result<PathBuf> {
        let info = resolve_model_id(model)
            .ok_or_else(|| ResumeMatcherError::ModelNotFound(model.to_string()))?;

        let model_dir = self.models_dir.join(info.id);
        if self.is_model_downloaded(info.id) {
            info!("Model {} already present at {}", info.id, model_dir.display());
            return Ok(model_dir);
        }

        info!("Downloading {} ({} MB) from {}", info.name, info.size_mb, info.repo_id);
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| ResumeMatcherError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(info.repo_id.to_string());

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES) {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await.map_err(|e| {
                        ResumeMatcherError::ModelError(format!("Failed to copy {}: {}", file, e))
                    })?;
                    info!("Fetched {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not available: {}", file, e);
                }
                Err(e) => {
                    return Err(ResumeMatcherError::Network(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        self.downloaded.insert(info.id.to_string());
        Ok(model_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_model(dir: &Path, id: &str) {
        let path = dir.join(id);
        std::fs::create_dir_all(&path).unwrap();
        for f in REQUIRED_FILES {
            std::fs::write(path.join(f), b"{}").unwrap();
        }
    }

    #[test]
    fn test_resolve_model_id() {
        assert_eq!(resolve_model_id("potion-base-8M").map(|m| m.id), Some("potion-base-8M"));
        assert_eq!(resolve_model_id("minishlab/potion-base-8M").map(|m| m.id), Some("potion-base-8M"));
        assert_eq!(resolve_model_id("model2vec large").map(|m| m.id), Some("m2v-large"));
        assert!(resolve_model_id("bert-base").is_none());
    }

    #[tokio::test]
    async fn test_empty_store_selects_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().join("models")).await.unwrap();
        assert!(manager.list_downloaded_models().is_empty());
        assert_eq!(manager.auto_select_model(), "potion-base-8M");
        assert!(manager.get_model_path("potion-base-8M").is_none());
    }

    #[tokio::test]
    async fn test_scan_finds_complete_models_only() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "m2v-large");
        std::fs::create_dir_all(temp_dir.path().join("m2v-base")).unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        assert_eq!(manager.list_downloaded_models(), vec!["m2v-large".to_string()]);
        assert_eq!(manager.auto_select_model(), "m2v-large");
        assert_eq!(
            manager.get_model_path("m2v-large"),
            Some(temp_dir.path().join("m2v-large"))
        );
    }

    #[tokio::test]
    async fn test_download_unknown_model() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        let err = manager.download_model("bert-base").await.unwrap_err();
        assert!(matches!(err, ResumeMatcherError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn test_download_skips_present_model() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "potion-base-8M");
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        let path = manager.download_model("minishlab/potion-base-8M").await.unwrap();
        assert_eq!(path, temp_dir.path().join("potion-base-8M"));
    }
}
