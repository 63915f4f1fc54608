//! Analysis engine combining the hybrid matcher and the structure critique

use crate::config::Config;
use crate::error::Result;
use crate::processing::embeddings::Embedder;
use crate::processing::matcher::{MatchBreakdown, Matcher};
use crate::processing::structure::{StructureAnalyzer, StructureReport};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Coordinates the two deterministic scorers over one embedding provider.
///
/// The matcher and the structure analyzer never consult each other; the
/// engine holds no per-request state and can be shared across threads.
pub struct AnalysisEngine<E: Embedder> {
    embedder: E,
    matcher: Matcher,
    structure: StructureAnalyzer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreAnalysis {
    pub match_result: MatchBreakdown,
    pub structure: StructureReport,
    pub embedding_model: String,
    pub processing_time_ms: u64,
}

impl<E: Embedder> AnalysisEngine<E> {
    pub fn new(config: &Config, embedder: E) -> Result<Self> {
        Ok(Self {
            embedder,
            matcher: Matcher::new(config.scoring.clone()),
            structure: StructureAnalyzer::new(config.structure.clone())?,
        })
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Match score plus structural feedback for one resume/job pair.
    pub fn analyze(&self, resume_text: &str, jd_text: &str) -> Result<CoreAnalysis> {
        let start_time = Instant::now();

        let match_result = self.matcher.compute_match_score(resume_text, jd_text, &self.embedder)?;
        let structure = self.structure.analyze_structure(resume_text);

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Analysis finished in {}ms: match {:.1}% ({}), structure {}/100",
            processing_time_ms, match_result.match_score, match_result.tier, structure.score
        );

        Ok(CoreAnalysis {
            match_result,
            structure,
            embedding_model: self.embedder.model_name().to_string(),
            processing_time_ms,
        })
    }
}
