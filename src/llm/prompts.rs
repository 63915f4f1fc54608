//! Prompt templates for skill-gap extraction and bullet rewriting

/// Keyword text used when no missing skills are known.
pub const FALLBACK_KEYWORDS: &str = "relevant skills";

const SKILL_GAP_TEMPLATE: &str = "Extract hard skills from JD only.\nJD: {jd}\nResume: {resume}\n\
Return JSON: {\"missing_skills\": [...], \"suggested_phrases\": [...]}";

const BULLET_REWRITE_TEMPLATE: &str = "Rewrite this bullet including these keywords naturally: {kw}\n\
Keep <120 chars, make quantifiable if possible.\nBullet: {b}";

pub fn render_skill_gap_prompt(jd_text: &str, resume_text: &str) -> String {
    // Resume first so braces in the JD are never substituted twice
    SKILL_GAP_TEMPLATE
        .replacen("{resume}", resume_text, 1)
        .replacen("{jd}", jd_text, 1)
}

/// Join up to `limit` keywords, falling back to a generic phrase.
pub fn rewrite_keywords(keywords: &[String], limit: usize) -> String {
    if keywords.is_empty() || limit == 0 {
        return FALLBACK_KEYWORDS.to_string();
    }
    keywords.iter().take(limit).map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn render_rewrite_prompt(bullet: &str, keywords: &str) -> String {
    BULLET_REWRITE_TEMPLATE
        .replacen("{b}", bullet, 1)
        .replacen("{kw}", keywords, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_gap_prompt() {
        let prompt = render_skill_gap_prompt("Need Go", "I know Rust");
        assert_eq!(
            prompt,
            "Extract hard skills from JD only.\nJD: Need Go\nResume: I know Rust\n\
Return JSON: {\"missing_skills\": [...], \"suggested_phrases\": [...]}"
        );
    }

    #[test]
    fn test_placeholders_in_input_are_left_alone() {
        let prompt = render_skill_gap_prompt("JD mentions {resume}", "plain");
        assert!(prompt.contains("JD: JD mentions {resume}\nResume: plain"));
    }

    #[test]
    fn test_rewrite_keywords() {
        let skills: Vec<String> = ["Go", "Kafka", "gRPC", "Redis", "Terraform", "Helm"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(rewrite_keywords(&skills, 5), "Go, Kafka, gRPC, Redis, Terraform");
        assert_eq!(rewrite_keywords(&[], 5), "relevant skills");
    }

    #[test]
    fn test_rewrite_prompt() {
        let prompt = render_rewrite_prompt("Built APIs", "Go, Kafka");
        assert_eq!(
            prompt,
            "Rewrite this bullet including these keywords naturally: Go, Kafka\n\
Keep <120 chars, make quantifiable if possible.\nBullet: Built APIs"
        );
    }
}
