//! Skill-gap extraction and bullet rewriting on top of a `TextGenerator`

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::client::TextGenerator;
use crate::llm::prompts::{render_rewrite_prompt, render_skill_gap_prompt, rewrite_keywords};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGaps {
    pub missing_skills: Vec<String>,
    pub suggested_phrases: Vec<String>,
}

impl SkillGaps {
    pub fn is_empty(&self) -> bool {
        self.missing_skills.is_empty() && self.suggested_phrases.is_empty()
    }
}

pub struct SkillGapAnalyzer<G: TextGenerator> {
    generator: G,
    max_missing_skills: usize,
    max_suggested_phrases: usize,
    rewrite_keyword_count: usize,
}

impl<G: TextGenerator> SkillGapAnalyzer<G> {
    pub fn new(generator: G, config: &LlmConfig) -> Self {
        Self {
            generator,
            max_missing_skills: config.max_missing_skills,
            max_suggested_phrases: config.max_suggested_phrases,
            rewrite_keyword_count: config.rewrite_keyword_count,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Ask the generator which JD skills the resume lacks.
    ///
    /// Transport failures are errors; a reply that is not the expected JSON
    /// object yields empty lists.
    pub async fn extract_gaps(&self, resume_text: &str, jd_text: &str) -> Result<SkillGaps> {
        let prompt = render_skill_gap_prompt(jd_text, resume_text);
        let reply = self.generator.generate(&prompt).await?;

        let mut gaps = parse_skill_gaps(&reply);
        gaps.missing_skills.truncate(self.max_missing_skills);
        gaps.suggested_phrases.truncate(self.max_suggested_phrases);

        debug!(
            "{} missing skills, {} suggested phrases from {}",
            gaps.missing_skills.len(),
            gaps.suggested_phrases.len(),
            self.generator.model_name()
        );
        Ok(gaps)
    }

    /// Rewrite one bullet around the first few missing skills.
    pub async fn rewrite_bullet(&self, bullet: &str, missing_skills: &[String]) -> Result<String> {
        let keywords = rewrite_keywords(missing_skills, self.rewrite_keyword_count);
        let prompt = render_rewrite_prompt(bullet.trim(), &keywords);
        let reply = self.generator.generate(&prompt).await?;
        Ok(reply.trim().to_string())
    }
}

/// Lenient parse of a model reply into skill gaps.
pub fn parse_skill_gaps(reply: &str) -> SkillGaps {
    let Some(object) = extract_json_object(reply) else {
        warn!("Generation reply contained no JSON object");
        return SkillGaps::default();
    };

    SkillGaps {
        missing_skills: string_items(&object, "missing_skills"),
        suggested_phrases: string_items(&object, "suggested_phrases"),
    }
}

fn extract_json_object(reply: &str) -> Option<serde_json::Map<String, Value>> {
    let body = strip_code_fence(reply.trim());

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return Some(map);
    }

    // Prose around the object: take the outermost braces
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&body[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as `json`
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn string_items(object: &serde_json::Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::ResumeMatcherError;
    use std::sync::Mutex;

    /// Generator returning a fixed reply and recording prompts.
    pub struct CannedGenerator {
        reply: std::result::Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(ResumeMatcherError::Generation)
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::CannedGenerator;
    use super::*;

    fn analyzer(reply: &str) -> SkillGapAnalyzer<CannedGenerator> {
        SkillGapAnalyzer::new(CannedGenerator::replying(reply), &LlmConfig::default())
    }

    #[test]
    fn test_parse_plain_object() {
        let gaps = parse_skill_gaps(r#"{"missing_skills": ["Kafka", "Go"], "suggested_phrases": ["Built Kafka pipelines"]}"#);
        assert_eq!(gaps.missing_skills, vec!["Kafka", "Go"]);
        assert_eq!(gaps.suggested_phrases, vec!["Built Kafka pipelines"]);
    }

    #[test]
    fn test_parse_fenced_and_wrapped_replies() {
        let fenced = "```json\n{\"missing_skills\": [\"Helm\"]}\n```";
        assert_eq!(parse_skill_gaps(fenced).missing_skills, vec!["Helm"]);

        let chatty = "Sure! Here you go: {\"missing_skills\": [\"SQL\"], \"suggested_phrases\": []} Hope it helps.";
        assert_eq!(parse_skill_gaps(chatty).missing_skills, vec!["SQL"]);
    }

    #[test]
    fn test_malformed_replies_are_empty() {
        assert!(parse_skill_gaps("I cannot help with that").is_empty());
        assert!(parse_skill_gaps("[\"Kafka\"]").is_empty());
        assert!(parse_skill_gaps("{\"missing_skills\": \"Kafka\"}").is_empty());
        assert!(parse_skill_gaps("{broken json}").is_empty());
    }

    #[test]
    fn test_non_string_items_are_skipped() {
        let gaps = parse_skill_gaps(r#"{"missing_skills": ["Go", 3, null, {"x": 1}, " ", "Rust"]}"#);
        assert_eq!(gaps.missing_skills, vec!["Go", "Rust"]);
        assert!(gaps.suggested_phrases.is_empty());
    }

    #[tokio::test]
    async fn test_extract_gaps_truncates() {
        let skills: Vec<String> = (0..20).map(|i| format!("\"skill{}\"", i)).collect();
        let phrases: Vec<String> = (0..10).map(|i| format!("\"phrase{}\"", i)).collect();
        let reply = format!(
            "{{\"missing_skills\": [{}], \"suggested_phrases\": [{}]}}",
            skills.join(","),
            phrases.join(",")
        );

        let gaps = analyzer(&reply).extract_gaps("resume", "job description").await.unwrap();
        assert_eq!(gaps.missing_skills.len(), 15);
        assert_eq!(gaps.missing_skills[14], "skill14");
        assert_eq!(gaps.suggested_phrases.len(), 8);
    }

    #[tokio::test]
    async fn test_extract_gaps_sends_both_texts() {
        let analyzer = analyzer("{}");
        let gaps = analyzer.extract_gaps("RESUME BODY", "JD BODY").await.unwrap();
        assert!(gaps.is_empty());

        let prompt = analyzer.generator().last_prompt().unwrap();
        assert!(prompt.contains("JD: JD BODY\nResume: RESUME BODY"));
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let analyzer = SkillGapAnalyzer::new(CannedGenerator::failing("quota"), &LlmConfig::default());
        assert!(analyzer.extract_gaps("r", "j").await.is_err());
        assert!(analyzer.rewrite_bullet("b", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_rewrite_uses_first_five_skills() {
        let analyzer = analyzer("  Shipped Go and Kafka services cutting latency 30%\n");
        let skills: Vec<String> = ["Go", "Kafka", "gRPC", "Redis", "Helm", "Istio"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rewritten = analyzer.rewrite_bullet(" Built services ", &skills).await.unwrap();
        assert_eq!(rewritten, "Shipped Go and Kafka services cutting latency 30%");

        let prompt = analyzer.generator().last_prompt().unwrap();
        assert!(prompt.contains("naturally: Go, Kafka, gRPC, Redis, Helm\n"));
        assert!(prompt.ends_with("Bullet: Built services"));
    }

    #[tokio::test]
    async fn test_rewrite_without_skills_uses_fallback() {
        let analyzer = analyzer("ok");
        analyzer.rewrite_bullet("Did work", &[]).await.unwrap();
        let prompt = analyzer.generator().last_prompt().unwrap();
        assert!(prompt.contains("naturally: relevant skills\n"));
    }
}
