//! Rule-based ATS structure critique of a resume's plain text

use crate::error::{Result, ResumeMatcherError};
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Penalties and thresholds of the structural checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureRules {
    /// Characters treated as one printed page
    pub chars_per_page: usize,
    pub max_pages: f64,
    pub length_penalty: i32,
    pub missing_section_penalty: i32,
    pub strong_quantified_lines: usize,
    pub strong_quantified_bullet_pct: f64,
    pub weak_quantification_penalty: i32,
    pub no_quantification_penalty: i32,
    /// Lines with more words than this count as bullets even without a marker
    pub bullet_min_words: usize,
    pub max_bullet_chars: usize,
    pub long_bullet_penalty: i32,
    pub score_floor: i32,
}

impl Default for StructureRules {
    fn default() -> Self {
        Self {
            chars_per_page: 3000,
            max_pages: 1.3,
            length_penalty: 10,
            missing_section_penalty: 10,
            strong_quantified_lines: 3,
            strong_quantified_bullet_pct: 30.0,
            weak_quantification_penalty: 3,
            no_quantification_penalty: 5,
            bullet_min_words: 6,
            max_bullet_chars: 160,
            long_bullet_penalty: 7,
            score_floor: 55,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    Experience,
    Projects,
    Skills,
    Education,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Education,
    ];

    /// Headings accepted for the section, lowercase.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Experience => &["experience", "professional experience", "work experience", "employment"],
            SectionKind::Projects => &["projects", "data science projects", "academic projects", "research", "portfolio"],
            SectionKind::Skills => &["skills", "technical skills", "core skills", "competencies"],
            SectionKind::Education => &["education", "academic background", "qualifications"],
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SectionKind::Experience => write!(f, "Experience"),
            SectionKind::Projects => write!(f, "Projects"),
            SectionKind::Skills => write!(f, "Skills"),
            SectionKind::Education => write!(f, "Education"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    Length,
    Section(SectionKind),
    Quantification,
    BulletLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    Pass,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureFinding {
    pub check: CheckKind,
    pub status: FindingStatus,
    pub message: String,
}

impl StructureFinding {
    fn pass(check: CheckKind, message: impl Into<String>) -> Self {
        Self { check, status: FindingStatus::Pass, message: message.into() }
    }

    fn warn(check: CheckKind, message: impl Into<String>) -> Self {
        Self { check, status: FindingStatus::Warn, message: message.into() }
    }

    pub fn is_warning(&self) -> bool {
        self.status == FindingStatus::Warn
    }
}

impl fmt::Display for StructureFinding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            FindingStatus::Pass => write!(f, "✅ {}", self.message),
            FindingStatus::Warn => write!(f, "⚠ {}", self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureStats {
    pub estimated_pages: f64,
    pub line_count: usize,
    pub bullet_count: usize,
    pub quantified_lines: usize,
    pub quantified_bullet_pct: f64,
    pub longest_bullet_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub score: i32,
    pub findings: Vec<StructureFinding>,
    pub stats: StructureStats,
}

impl StructureReport {
    pub fn warnings(&self) -> impl Iterator<Item = &StructureFinding> {
        self.findings.iter().filter(|f| f.is_warning())
    }
}

const BULLET_MARKERS: [char; 4] = ['*', '-', '•', '–'];

const METRIC_PATTERNS: &[&str] = &[
    r"\d+(\.\d+)?%",
    r"\$\d+(\.\d+)?[kKmMbB]?",
    r"\d+(\.\d+)?[kKmMbB]",
    r"\d{1,3}(,\d{3})+",
    r"\d+\s*(years?|months?|days?|hours?|weeks?)",
    r"\d+\+",
    r"(?i)over\s+\d+",
    r"(?i)more\s+than\s+\d+",
    r"(\d+)\s*(to|-)\s*(\d+)",
    r"(?i)increased\s+by\s+\d+",
    r"(?i)reduced\s+by\s+\d+",
    r"(?i)\d+x",
    r"(?i)\d+\s*(people|users|customers|clients|projects|teams)",
];

const ACTION_WORDS: &[&str] = &[
    "increased", "decreased", "improved", "reduced", "achieved", "managed", "led",
    "handled", "processed", "generated", "saved", "delivered", "completed", "created",
    "developed", "implemented",
];

/// Structural analyzer with its patterns compiled once.
pub struct StructureAnalyzer {
    rules: StructureRules,
    section_patterns: Vec<(SectionKind, Vec<Regex>)>,
    metric_patterns: Vec<Regex>,
    standalone_number: Regex,
    action_words: AhoCorasick,
}

impl StructureAnalyzer {
    pub fn new(rules: StructureRules) -> Result<Self> {
        let section_patterns = SectionKind::ALL
            .iter()
            .map(|kind| {
                let patterns = kind
                    .aliases()
                    .iter()
                    .map(|alias| compile(&format!(r"(?m)^\s*{}\b", regex::escape(alias))))
                    .collect::<Result<Vec<_>>>()?;
                Ok((*kind, patterns))
            })
            .collect::<Result<Vec<_>>>()?;

        let metric_patterns = METRIC_PATTERNS
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;

        let action_words = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(ACTION_WORDS)
            .map_err(|e| ResumeMatcherError::TextProcessing(format!("Failed to build action word matcher: {}", e)))?;

        Ok(Self {
            rules,
            section_patterns,
            metric_patterns,
            standalone_number: compile(r"\b\d{2,}\b")?,
            action_words,
        })
    }

    pub fn rules(&self) -> &StructureRules {
        &self.rules
    }

    /// Run every check in order: length, sections, quantification, bullet length.
    pub fn analyze_structure(&self, text: &str) -> StructureReport {
        let lines: Vec<&str> = text.split('\n').map(str::trim).filter(|l| !l.is_empty()).collect();
        let lower_text = text.to_lowercase();

        let mut findings = Vec::with_capacity(7);
        let mut score = 100;

        let estimated_pages = text.chars().count() as f64 / self.rules.chars_per_page as f64;
        if estimated_pages > self.rules.max_pages {
            findings.push(StructureFinding::warn(CheckKind::Length, "Resume likely exceeds 1 page"));
            score -= self.rules.length_penalty;
        } else {
            findings.push(StructureFinding::pass(CheckKind::Length, "Resume length is ATS-friendly"));
        }

        for (kind, patterns) in &self.section_patterns {
            let check = CheckKind::Section(*kind);
            if patterns.iter().any(|p| p.is_match(&lower_text)) {
                findings.push(StructureFinding::pass(check, format!("'{}' section found", kind)));
            } else {
                findings.push(StructureFinding::warn(check, format!("Missing '{}' section", kind)));
                score -= self.rules.missing_section_penalty;
            }
        }

        let bullets: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| self.is_bullet(l))
            .map(|(i, _)| i)
            .collect();

        let quantified = self.quantified_line_indices(&lines);
        let quantified_count = quantified.len();
        let quantified_bullets = bullets.iter().filter(|i| quantified.contains(i)).count();
        let quantified_bullet_pct = if bullets.is_empty() {
            0.0
        } else {
            quantified_bullets as f64 / bullets.len().max(1) as f64 * 100.0
        };

        if quantified_count >= self.rules.strong_quantified_lines
            || quantified_bullet_pct >= self.rules.strong_quantified_bullet_pct
        {
            findings.push(StructureFinding::pass(
                CheckKind::Quantification,
                format!("Strong use of quantified achievements ({} found)", quantified_count),
            ));
        } else if quantified_count >= 1 {
            findings.push(StructureFinding::warn(
                CheckKind::Quantification,
                format!("Good quantification — found {} metric(s), could add more", quantified_count),
            ));
            score -= self.rules.weak_quantification_penalty;
        } else {
            findings.push(StructureFinding::warn(
                CheckKind::Quantification,
                "Quantification could be improved — add numbers, percentages, or metrics",
            ));
            score -= self.rules.no_quantification_penalty;
        }

        let longest_bullet_chars = bullets
            .iter()
            .map(|&i| lines[i].chars().count())
            .max()
            .unwrap_or(0);
        if longest_bullet_chars > self.rules.max_bullet_chars {
            findings.push(StructureFinding::warn(
                CheckKind::BulletLength,
                format!("Some bullets are too long (keep under {} chars)", self.rules.max_bullet_chars),
            ));
            score -= self.rules.long_bullet_penalty;
        } else {
            findings.push(StructureFinding::pass(CheckKind::BulletLength, "Bullet length is ATS-friendly"));
        }

        StructureReport {
            score: score.max(self.rules.score_floor),
            findings,
            stats: StructureStats {
                estimated_pages,
                line_count: lines.len(),
                bullet_count: bullets.len(),
                quantified_lines: quantified_count,
                quantified_bullet_pct,
                longest_bullet_chars,
            },
        }
    }

    /// A marker at the start, or enough words to read as a bullet.
    pub fn is_bullet(&self, line: &str) -> bool {
        line.starts_with(BULLET_MARKERS) || line.split_whitespace().count() > self.rules.bullet_min_words
    }

    /// True when a line carries a metric pattern or a number next to an action verb.
    pub fn is_quantified(&self, line: &str) -> bool {
        self.matches_metric_pattern(line) || self.has_number_with_action(line)
    }

    fn matches_metric_pattern(&self, line: &str) -> bool {
        self.metric_patterns.iter().any(|p| p.is_match(line))
    }

    fn has_number_with_action(&self, line: &str) -> bool {
        self.standalone_number.is_match(line) && self.action_words.is_match(line)
    }

    /// Indices of quantified lines; each index appears once even if both passes match.
    fn quantified_line_indices(&self, lines: &[&str]) -> BTreeSet<usize> {
        let mut quantified: BTreeSet<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| self.matches_metric_pattern(l))
            .map(|(i, _)| i)
            .collect();

        for (i, line) in lines.iter().enumerate() {
            if !quantified.contains(&i) && self.has_number_with_action(line) {
                quantified.insert(i);
            }
        }

        quantified
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ResumeMatcherError::TextProcessing(format!("Invalid pattern '{}': {}", pattern, e)))
}
