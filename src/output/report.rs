//! Report assembled from the scoring pipeline and optional generation output

use crate::llm::analyzer::SkillGaps;
use crate::processing::analyzer::CoreAnalysis;
use crate::processing::matcher::MatchBreakdown;
use crate::processing::structure::StructureReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closing line shown with every report.
pub const PRIVACY_NOTICE: &str = "Your data was processed only in memory and has already been deleted.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub metadata: ReportMetadata,
    /// Absent for structure-only runs
    pub match_result: Option<MatchBreakdown>,
    pub structure: StructureReport,
    pub skill_gaps: Option<SkillGaps>,
    pub rewritten_bullet: Option<RewrittenBullet>,
    /// Non-fatal problems, such as an unavailable generation service
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub resume_file: String,
    pub job_source: Option<String>,
    pub embedding_model: Option<String>,
    pub generation_model: Option<String>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewrittenBullet {
    pub original: String,
    pub rewritten: String,
}

impl ReportMetadata {
    fn new(resume_file: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            resume_file: resume_file.to_string(),
            job_source: None,
            embedding_model: None,
            generation_model: None,
            processing_time_ms: 0,
        }
    }
}

impl MatchReport {
    pub fn from_analysis(analysis: CoreAnalysis, resume_file: &str, job_source: &str) -> Self {
        let mut metadata = ReportMetadata::new(resume_file);
        metadata.job_source = Some(job_source.to_string());
        metadata.embedding_model = Some(analysis.embedding_model);
        metadata.processing_time_ms = analysis.processing_time_ms;

        Self {
            metadata,
            match_result: Some(analysis.match_result),
            structure: analysis.structure,
            skill_gaps: None,
            rewritten_bullet: None,
            warnings: Vec::new(),
        }
    }

    pub fn structure_only(structure: StructureReport, resume_file: &str) -> Self {
        Self {
            metadata: ReportMetadata::new(resume_file),
            match_result: None,
            structure,
            skill_gaps: None,
            rewritten_bullet: None,
            warnings: Vec::new(),
        }
    }

    pub fn set_skill_gaps(&mut self, gaps: SkillGaps) {
        self.skill_gaps = Some(gaps);
    }

    pub fn set_rewritten_bullet(&mut self, original: &str, rewritten: String) {
        self.rewritten_bullet = Some(RewrittenBullet {
            original: original.to_string(),
            rewritten,
        });
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Missing skills reported by generation, empty when it did not run.
    pub fn missing_skills(&self) -> Vec<String> {
        self.skill_gaps
            .as_ref()
            .map(|gaps| gaps.missing_skills.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::processing::matcher::MatchTier;
    use crate::processing::structure::{StructureAnalyzer, StructureRules};

    pub fn sample_report() -> MatchReport {
        let structure = StructureAnalyzer::new(StructureRules::default())
            .unwrap()
            .analyze_structure("Experience\n- Led a team of 5 people\nSkills\nRust");
        let analysis = CoreAnalysis {
            match_result: MatchBreakdown {
                semantic_score: 62.5,
                keyword_score: 40.0,
                match_score: 71.9,
                tier: MatchTier::Okay,
                chunks_considered: 1,
                jd_keyword_count: 5,
                matched_keywords: vec!["rust".to_string(), "team".to_string()],
                missing_keywords: vec!["kafka".to_string(), "kubernetes".to_string(), "remote".to_string()],
            },
            structure,
            embedding_model: "letters".to_string(),
            processing_time_ms: 12,
        };
        MatchReport::from_analysis(analysis, "resume.txt", "job.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_report;
    use super::*;

    #[test]
    fn test_from_analysis_fills_metadata() {
        let report = sample_report();
        assert_eq!(report.metadata.resume_file, "resume.txt");
        assert_eq!(report.metadata.job_source.as_deref(), Some("job.txt"));
        assert_eq!(report.metadata.embedding_model.as_deref(), Some("letters"));
        assert_eq!(report.metadata.processing_time_ms, 12);
        assert!(report.skill_gaps.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_skills_come_from_generation() {
        let mut report = sample_report();
        assert!(report.missing_skills().is_empty());

        report.set_skill_gaps(SkillGaps {
            missing_skills: vec!["Kafka".to_string()],
            suggested_phrases: vec![],
        });
        assert_eq!(report.missing_skills(), vec!["Kafka"]);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = sample_report();
        report.metadata.generation_model = Some("canned".to_string());
        report.add_warning("Could not extract missing skills: quota");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["match_result"]["tier"], "Okay");
        assert_eq!(json["metadata"]["generation_model"], "canned");
        assert_eq!(json["warnings"][0], "Could not extract missing skills: quota");
    }
}
