//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeMatcherError>;

/// model2vec-rs reports its failures through anyhow
impl From<anyhow::Error> for ResumeMatcherError {
    fn from(err: anyhow::Error) -> Self {
        ResumeMatcherError::Embedding(err.to_string())
    }
}

impl From<std::fmt::Error> for ResumeMatcherError {
    fn from(err: std::fmt::Error) -> Self {
        ResumeMatcherError::OutputFormatting(err.to_string())
    }
}

impl From<reqwest::Error> for ResumeMatcherError {
    fn from(err: reqwest::Error) -> Self {
        ResumeMatcherError::Network(err.to_string())
    }
}

impl ResumeMatcherError {
    /// True for failures of an external collaborator (embedding model or
    /// generation service) rather than of the input itself.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            ResumeMatcherError::Embedding(_)
                | ResumeMatcherError::Generation(_)
                | ResumeMatcherError::Network(_)
                | ResumeMatcherError::ModelError(_)
                | ResumeMatcherError::ModelNotFound(_)
        )
    }

    /// Process exit status: 2 when an external collaborator failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_dependency_failure() {
            2
        } else {
            1
        }
    }
}
