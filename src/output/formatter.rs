//! Output formatters: colored console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{MatchReport, PRIVACY_NOTICE};
use crate::processing::matcher::MatchTier;
use crate::processing::structure::{FindingStatus, StructureReport};
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Dispatches a report to the formatter for the requested format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn tier_color(tier: MatchTier) -> Color {
    match tier {
        MatchTier::Strong => Color::Green,
        MatchTier::Okay => Color::Yellow,
        MatchTier::NeedsWork => Color::Red,
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "▓".blue().bold(), title.blue().bold())
        } else {
            format!("\n== {}\n", title)
        }
    }

    fn format_tier_badge(&self, tier: MatchTier) -> String {
        let badge = format!("[{}]", tier.to_string().to_uppercase());
        if self.use_colors {
            badge.color(tier_color(tier)).bold().to_string()
        } else {
            badge
        }
    }

    fn format_structure(&self, out: &mut String, structure: &StructureReport) -> Result<()> {
        out.push_str(&self.format_header("Resume Structure Feedback"));
        writeln!(out, "Structure Score: {}/100", structure.score)?;
        for finding in &structure.findings {
            let color = match finding.status {
                FindingStatus::Pass => Color::Green,
                FindingStatus::Warn => Color::Yellow,
            };
            writeln!(out, "  {}", self.colorize(&finding.to_string(), color))?;
        }

        if self.detailed {
            let stats = &structure.stats;
            writeln!(
                out,
                "\n  Pages: {:.2} | Lines: {} | Bullets: {} | Quantified lines: {} ({:.0}% of bullets) | Longest bullet: {} chars",
                stats.estimated_pages,
                stats.line_count,
                stats.bullet_count,
                stats.quantified_lines,
                stats.quantified_bullet_pct,
                stats.longest_bullet_chars
            )?;
        }
        Ok(())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut out = String::new();

        out.push_str(&self.format_header("📊 RESUME MATCH ANALYSIS"));
        writeln!(
            out,
            "Generated: {} | Processing time: {}ms",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        )?;

        if let Some(result) = &report.match_result {
            out.push_str(&self.format_header("Match Score"));
            writeln!(
                out,
                "Match Score: {} {}",
                self.colorize(&format!("{:.1}%", result.match_score), tier_color(result.tier)),
                self.format_tier_badge(result.tier)
            )?;
            writeln!(
                out,
                "🎯 Semantic: {:.1}% | 🔑 Keywords: {:.1}%",
                result.semantic_score, result.keyword_score
            )?;

            if self.detailed {
                writeln!(
                    out,
                    "Chunks compared: {} | JD keywords: {}",
                    result.chunks_considered, result.jd_keyword_count
                )?;
                if !result.matched_keywords.is_empty() {
                    writeln!(out, "Matched: {}", result.matched_keywords.join(", "))?;
                }
                if !result.missing_keywords.is_empty() {
                    writeln!(
                        out,
                        "Not found: {}",
                        self.colorize(&result.missing_keywords.join(", "), Color::Red)
                    )?;
                }
                if let Some(model) = &report.metadata.embedding_model {
                    writeln!(out, "Embedding model: {}", model)?;
                }
            }
        }

        if let Some(gaps) = &report.skill_gaps {
            if !gaps.missing_skills.is_empty() {
                out.push_str(&self.format_header("Missing Keywords"));
                let skills: Vec<String> = gaps
                    .missing_skills
                    .iter()
                    .map(|s| self.colorize(s, Color::Red))
                    .collect();
                writeln!(out, "{}", skills.join(", "))?;
            }
            if !gaps.suggested_phrases.is_empty() {
                out.push_str(&self.format_header("Suggested Phrases"));
                for phrase in &gaps.suggested_phrases {
                    writeln!(out, "  • {}", phrase)?;
                }
            }
        }

        if let Some(bullet) = &report.rewritten_bullet {
            out.push_str(&self.format_header("Bullet Rewriter"));
            writeln!(out, "Before: {}", bullet.original)?;
            writeln!(out, "After:  {}", self.colorize(&bullet.rewritten, Color::Green))?;
        }

        self.format_structure(&mut out, &report.structure)?;

        if !report.warnings.is_empty() {
            out.push('\n');
            for warning in &report.warnings {
                writeln!(out, "{}", self.colorize(&format!("⚠ {}", warning), Color::Yellow))?;
            }
        }

        writeln!(out, "\n{}", self.colorize(PRIVACY_NOTICE, Color::Cyan))?;
        Ok(out)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut md = String::from("# Resume Match Analysis\n\n");

        if self.include_metadata {
            let meta = &report.metadata;
            writeln!(md, "- **Resume:** {}", meta.resume_file)?;
            if let Some(job) = &meta.job_source {
                writeln!(md, "- **Job description:** {}", job)?;
            }
            writeln!(md, "- **Generated:** {}", meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
            if let Some(model) = &meta.embedding_model {
                writeln!(md, "- **Embedding model:** {}", model)?;
            }
            if let Some(model) = &meta.generation_model {
                writeln!(md, "- **Generation model:** {}", model)?;
            }
            md.push('\n');
        }

        if let Some(result) = &report.match_result {
            md.push_str("## Match Score\n\n");
            writeln!(md, "**{:.1}%** ({})\n", result.match_score, result.tier)?;
            md.push_str("| Signal | Score |\n|---|---|\n");
            writeln!(md, "| Semantic | {:.1}% |", result.semantic_score)?;
            writeln!(md, "| Keywords | {:.1}% |\n", result.keyword_score)?;
        }

        if let Some(gaps) = &report.skill_gaps {
            if !gaps.missing_skills.is_empty() {
                md.push_str("## Missing Keywords\n\n");
                let bold: Vec<String> = gaps.missing_skills.iter().map(|s| format!("**{}**", s)).collect();
                writeln!(md, "{}\n", bold.join(", "))?;
            }
            if !gaps.suggested_phrases.is_empty() {
                md.push_str("## Suggested Phrases\n\n");
                for phrase in &gaps.suggested_phrases {
                    writeln!(md, "- {}", phrase)?;
                }
                md.push('\n');
            }
        }

        if let Some(bullet) = &report.rewritten_bullet {
            md.push_str("## Bullet Rewriter\n\n");
            writeln!(md, "> {}\n\n{}\n", bullet.original, bullet.rewritten)?;
        }

        md.push_str("## Resume Structure Feedback\n\n");
        writeln!(md, "**Structure score:** {}/100\n", report.structure.score)?;
        for finding in &report.structure.findings {
            writeln!(md, "- {}", finding)?;
        }

        if !report.warnings.is_empty() {
            md.push_str("\n## Warnings\n\n");
            for warning in &report.warnings {
                writeln!(md, "- {}", warning)?;
            }
        }

        writeln!(md, "\n_{}_", PRIVACY_NOTICE)?;
        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// A directory target gets a generated file name inside it.
pub fn resolve_report_path(target: &Path, format: OutputFormat, resume_name: &str) -> PathBuf {
    if target.is_dir() {
        target.join(suggest_filename(format, resume_name))
    } else {
        target.to_path_buf()
    }
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_match_{}.{}", base_name, timestamp, extension)
}
