//! Configuration management for the resume matcher

use crate::error::{Result, ResumeMatcherError};
use crate::processing::matcher::MatchTuning;
use crate::processing::structure::StructureRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub models: ModelConfig,
    pub processing: ProcessingConfig,
    pub scoring: MatchTuning,
    pub structure: StructureRules,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub batch_size: usize,
    /// Job descriptions shorter than this (after trimming) are rejected
    pub min_job_description_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_missing_skills: usize,
    pub max_suggested_phrases: usize,
    pub rewrite_keyword_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            models_dir,
            default_embedding_model: "minishlab/potion-base-8M".to_string(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            min_job_description_chars: 10,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            api_key_env: "GROQ_API_KEY".to_string(),
            max_missing_skills: 15,
            max_suggested_phrases: 8,
            rewrite_keyword_count: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first run.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
