//! Hybrid semantic + keyword match scoring

use crate::error::{Result, ResumeMatcherError};
use crate::processing::embeddings::{cosine_similarity_matrix, max_similarity, Embedder};
use crate::processing::keywords::KeywordSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Empirically tuned weights, boosts and thresholds of the match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    pub semantic_weight: f64,
    pub keyword_weight: f64,

    /// Semantic score above which the strong boost applies
    pub strong_semantic_threshold: f64,
    pub strong_semantic_boost: f64,
    /// Semantic score above which the moderate boost applies
    pub moderate_semantic_threshold: f64,
    pub moderate_semantic_boost: f64,

    pub joint_semantic_threshold: f64,
    pub joint_keyword_threshold: f64,
    pub joint_boost: f64,

    pub floor_semantic_threshold: f64,
    pub floor_keyword_threshold: f64,
    pub floor_score: f64,

    pub max_score: f64,

    /// A resume line must be longer than this (in characters) to be a chunk
    pub min_chunk_chars: usize,
    pub max_chunks: usize,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            semantic_weight: 0.55,
            keyword_weight: 0.45,
            strong_semantic_threshold: 45.0,
            strong_semantic_boost: 1.15,
            moderate_semantic_threshold: 35.0,
            moderate_semantic_boost: 1.10,
            joint_semantic_threshold: 40.0,
            joint_keyword_threshold: 25.0,
            joint_boost: 1.05,
            floor_semantic_threshold: 30.0,
            floor_keyword_threshold: 20.0,
            floor_score: 45.0,
            max_score: 100.0,
            min_chunk_chars: 30,
            max_chunks: 30,
        }
    }
}

/// Caller-facing verdict for a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Strong,
    Okay,
    NeedsWork,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchTier::Strong
        } else if score >= 60.0 {
            MatchTier::Okay
        } else {
            MatchTier::NeedsWork
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchTier::Strong => write!(f, "Strong"),
            MatchTier::Okay => write!(f, "Okay"),
            MatchTier::NeedsWork => write!(f, "Needs work"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    /// Best single chunk similarity against the job description, 0-100
    pub semantic_score: f64,
    /// Share of job description keywords found in the resume, 0-100
    pub keyword_score: f64,
    /// Final blended score, 0-100, one decimal
    pub match_score: f64,
    pub tier: MatchTier,
    pub chunks_considered: usize,
    pub jd_keyword_count: usize,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

pub struct Matcher {
    tuning: MatchTuning,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchTuning::default())
    }
}

impl Matcher {
    pub fn new(tuning: MatchTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &MatchTuning {
        &self.tuning
    }

    /// Score a resume against a job description.
    ///
    /// Embedder failures propagate; there is no similarity fallback.
    pub fn compute_match_score(
        &self,
        resume_text: &str,
        jd_text: &str,
        embedder: &dyn Embedder,
    ) -> Result<MatchBreakdown> {
        let chunks = chunk_resume(resume_text, &self.tuning);
        let semantic_score = self.semantic_score(&chunks, jd_text, embedder)?;

        let jd_keywords = KeywordSet::from_text(jd_text);
        let resume_keywords = KeywordSet::from_text(resume_text);
        let keyword_score = resume_keywords.coverage_of(&jd_keywords);

        let match_score = blend(semantic_score, keyword_score, &self.tuning);

        debug!(
            "Match: semantic={:.2} keyword={:.2} chunks={} jd_keywords={} -> {}",
            semantic_score,
            keyword_score,
            chunks.len(),
            jd_keywords.len(),
            match_score
        );

        Ok(MatchBreakdown {
            semantic_score,
            keyword_score,
            match_score,
            tier: MatchTier::from_score(match_score),
            chunks_considered: chunks.len(),
            jd_keyword_count: jd_keywords.len(),
            matched_keywords: resume_keywords.matched(&jd_keywords),
            missing_keywords: resume_keywords.missing(&jd_keywords),
        })
    }

    fn semantic_score(&self, chunks: &[String], jd_text: &str, embedder: &dyn Embedder) -> Result<f64> {
        if chunks.is_empty() {
            return Ok(0.0);
        }

        let mut texts = chunks.to_vec();
        texts.push(jd_text.to_string());

        let mut vectors = embedder.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(ResumeMatcherError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        let jd_vector = vectors.pop().unwrap_or_default();
        let matrix = cosine_similarity_matrix(&vectors, std::slice::from_ref(&jd_vector))?;
        let best = max_similarity(&matrix).unwrap_or(0.0) as f64;

        Ok((best * 100.0).clamp(0.0, 100.0))
    }
}

/// Resume lines long enough to carry a semantic signal, in document order.
pub fn chunk_resume(text: &str, tuning: &MatchTuning) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() > tuning.min_chunk_chars)
        .take(tuning.max_chunks)
        .map(str::to_string)
        .collect()
}

/// Combine the two component scores with the confidence boosts and floor.
pub fn blend(semantic: f64, keyword: f64, tuning: &MatchTuning) -> f64 {
    let mut base = boosted_base(semantic, keyword, tuning);

    if semantic > tuning.floor_semantic_threshold || keyword > tuning.floor_keyword_threshold {
        base = base.max(tuning.floor_score);
    }

    round_one_decimal(base.min(tuning.max_score).max(0.0))
}

/// Weighted blend with both multiplicative boosts applied, before floor and cap.
pub fn boosted_base(semantic: f64, keyword: f64, tuning: &MatchTuning) -> f64 {
    let mut base = tuning.semantic_weight * semantic + tuning.keyword_weight * keyword;

    if semantic > tuning.strong_semantic_threshold {
        base *= tuning.strong_semantic_boost;
    } else if semantic > tuning.moderate_semantic_threshold {
        base *= tuning.moderate_semantic_boost;
    }

    if semantic > tuning.joint_semantic_threshold && keyword > tuning.joint_keyword_threshold {
        base *= tuning.joint_boost;
    }

    base
}

/// Exact ties go to the even digit, so 2.25 becomes 2.2.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
