//! Embeddings generation using Model2Vec, behind a swappable `Embedder` seam

use crate::config::Config;
use crate::error::{Result, ResumeMatcherError};
use crate::processing::embedding_manager::{is_model_directory, resolve_model_id};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Batch text embedding provider.
///
/// Implementations must be deterministic for identical input and safe to
/// share across threads; the matcher calls `embed` at most once per request.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    batch_size: usize,
    model_name: String,
}

impl EmbeddingEngine {
    /// Load a model from a local directory or a Hugging Face repo id.
    pub fn new(model_source: &Path, model_name: &str, batch_size: usize) -> Result<Self> {
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", model_source.display());

        let model = StaticModel::from_pretrained(
            model_source,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| ResumeMatcherError::Embedding(format!("Failed to load model: {}", e)))?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            batch_size: batch_size.max(1),
            model_name: model_name.to_string(),
        })
    }

    /// Resolve the model named by `model_override` or the config default.
    pub fn from_config(config: &Config, model_override: Option<&str>) -> Result<Self> {
        let model_name = model_override.unwrap_or(&config.models.default_embedding_model);
        let source = Self::resolve_model_source(config, model_name);
        Self::new(&source, model_name, config.processing.batch_size)
    }

    /// A downloaded copy under the models directory wins over a hub lookup.
    fn resolve_model_source(config: &Config, model_name: &str) -> PathBuf {
        if let Some(info) = resolve_model_id(model_name) {
            let local_path = config.models_dir().join(info.id);
            if is_model_directory(&local_path) {
                return local_path;
            }
            return PathBuf::from(info.repo_id);
        }

        let local_path = config.models_dir().join(model_name);
        if is_model_directory(&local_path) {
            return local_path;
        }

        // Either a filesystem path or a hub repo id
        PathBuf::from(model_name)
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start_time = Instant::now();
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.model.encode(batch));
        }

        if embeddings.len() != texts.len() {
            return Err(ResumeMatcherError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        debug!("Embedded {} texts in {:.2?}", texts.len(), start_time.elapsed());
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeMatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Similarity of every `rows` vector against every `cols` vector.
pub fn cosine_similarity_matrix(rows: &[Vec<f32>], cols: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
    rows.iter()
        .map(|row| cols.iter().map(|col| cosine_similarity(row, col)).collect())
        .collect()
}

/// Largest entry of a similarity matrix, `None` when it has no entries.
pub fn max_similarity(matrix: &[Vec<f32>]) -> Option<f32> {
    matrix
        .iter()
        .flatten()
        .copied()
        .fold(None, |best, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Bag-of-letters embedder: deterministic, no model files needed.
    pub struct LetterEmbedder {
        pub calls: AtomicUsize,
    }

    impl LetterEmbedder {
        pub fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Embedder for LetterEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 26];
                    for c in t.to_ascii_lowercase().bytes() {
                        if c.is_ascii_lowercase() {
                            v[(c - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }

    /// Embedder that always fails, standing in for an unavailable model.
    pub struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(ResumeMatcherError::Embedding("model unavailable".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_matrix_max() {
        let rows = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        let cols = vec![vec![1.0, 1.0]];
        let matrix = cosine_similarity_matrix(&rows, &cols).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].len(), 1);
        let best = max_similarity(&matrix).unwrap();
        assert!((best - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_of_empty_matrix() {
        assert_eq!(max_similarity(&[]), None);
        assert_eq!(max_similarity(&[vec![]]), None);
    }

    #[test]
    fn test_max_keeps_negative_values() {
        assert_eq!(max_similarity(&[vec![-0.5], vec![-0.2]]), Some(-0.2));
    }
}
