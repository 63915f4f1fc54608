//! Keyword extraction for lexical overlap scoring

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Common English function words ignored on both sides of the comparison
const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "should", "could", "may",
    "might", "must", "can", "this", "that", "these", "those", "i", "you", "he",
    "she", "it", "we", "they", "what", "which", "who", "where", "when", "why",
    "how", "all", "each", "every", "both", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "just", "now",
];

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-z]{3,}\b").expect("keyword pattern is valid"))
}

/// Returns true when `word` is one of the ignored function words.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercase alphabetic tokens of three or more letters, stopwords removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    words: BTreeSet<String>,
}

impl KeywordSet {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words = word_regex()
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !is_stop_word(w))
            .map(str::to_string)
            .collect();

        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Keywords of `target` also present in this set, sorted.
    pub fn matched(&self, target: &KeywordSet) -> Vec<String> {
        self.words.intersection(&target.words).cloned().collect()
    }

    /// Keywords of `target` absent from this set, sorted.
    pub fn missing(&self, target: &KeywordSet) -> Vec<String> {
        target.words.difference(&self.words).cloned().collect()
    }

    /// Percentage of `target` keywords covered by this set; 0 for an empty target.
    pub fn coverage_of(&self, target: &KeywordSet) -> f64 {
        if target.is_empty() {
            return 0.0;
        }
        let matched = self.words.intersection(&target.words).count();
        matched as f64 / target.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_drops_short_words_and_stopwords() {
        let set = KeywordSet::from_text("We need an AWS and Docker engineer, ok?");
        assert!(set.contains("aws"));
        assert!(set.contains("docker"));
        assert!(set.contains("engineer"));
        assert!(set.contains("need"));
        assert!(!set.contains("and"));
        assert!(!set.contains("ok"));
        assert!(!set.contains("we"));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_tokens_glued_to_digits_are_not_words() {
        // \b between a letter and a digit does not exist
        let set = KeywordSet::from_text("python3 k8s ec2 rust");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["rust"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = KeywordSet::from_text("Rust rust RUST rustacean");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_coverage_with_empty_target_is_zero() {
        let resume = KeywordSet::from_text("python aws docker");
        let jd = KeywordSet::from_text("and the of it");
        assert!(jd.is_empty());
        assert_eq!(resume.coverage_of(&jd), 0.0);
    }

    #[test]
    fn test_coverage_and_missing() {
        let resume = KeywordSet::from_text("python docker kubernetes");
        let jd = KeywordSet::from_text("python docker terraform golang");
        assert_eq!(resume.coverage_of(&jd), 50.0);
        assert_eq!(resume.matched(&jd), vec!["docker", "python"]);
        assert_eq!(resume.missing(&jd), vec!["golang", "terraform"]);
    }
}
