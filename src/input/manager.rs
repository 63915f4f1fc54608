//! Input manager routing files to extractors

use crate::error::{Result, ResumeMatcherError};
use crate::input::file_detector::{FileType, SUPPORTED_EXTENSIONS};
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.is_file() {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path);
        info!("Reading {} file: {}", file_type, path.display());

        let text = match file_type {
            FileType::Pdf => PdfExtractor.extract(path).await?,
            FileType::Text => PlainTextExtractor.extract(path).await?,
            FileType::Markdown => MarkdownExtractor.extract(path).await?,
            FileType::Unknown => {
                return Err(ResumeMatcherError::UnsupportedFormat(format!(
                    "{} (expected one of: {})",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    /// A job description may be passed as a file path or as the text itself.
    pub async fn read_job_text(&mut self, path_or_inline: &str) -> Result<String> {
        let candidate = Path::new(path_or_inline);
        if candidate.is_file() {
            self.extract_text(candidate).await
        } else {
            debug!("Treating job argument as inline text ({} chars)", path_or_inline.len());
            Ok(path_or_inline.to_string())
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
