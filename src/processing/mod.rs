//! Scoring pipeline: keywords, embeddings, hybrid matching and structure critique

pub mod keywords;
pub mod embeddings;
pub mod embedding_manager;
pub mod matcher;
pub mod structure;
pub mod analyzer;
