//! CLI interface for the resume matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Hybrid resume and job description match scoring")]
#[command(long_about = "Score a resume against a job description with semantic embeddings and keyword overlap, \
critique its ATS structure, and optionally ask a hosted model for missing skills and bullet rewrites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against a job description
    Align {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job description file, or the description text itself
        #[arg(short, long)]
        job: String,

        /// Embedding model to use
        #[arg(short, long)]
        embedding: Option<String>,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file, or into a directory under a generated name
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip the hosted model (embeddings + keywords only)
        #[arg(long)]
        no_llm: bool,

        /// Also rewrite this bullet around the missing skills
        #[arg(long)]
        rewrite: Option<String>,
    },

    /// Structure critique only, no models involved
    Structure {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Rewrite a single bullet with the hosted model
    Rewrite {
        /// Bullet text
        #[arg(short, long)]
        bullet: String,

        /// Comma-separated keywords to weave in
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model id, repo id or name
        model: String,
    },

    /// Show model information
    Info {
        /// Model id, repo id or name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed_extensions.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            allowed_extensions.join(", ")
        )),
        None => Err("File has no extension".to_string()),
    }
}

/// Reject job descriptions too short to score.
pub fn validate_job_text(text: &str, min_chars: usize) -> Result<(), String> {
    if text.trim().chars().count() < min_chars {
        Err(format!("Job description must be at least {} characters", min_chars))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_align_with_inline_job() {
        let cli = Cli::parse_from([
            "resume-matcher", "align", "-r", "cv.pdf", "-j", "Rust engineer wanted", "--no-llm",
        ]);
        match cli.command {
            Commands::Align { resume, job, no_llm, rewrite, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(job, "Rust engineer wanted");
                assert!(no_llm);
                assert!(rewrite.is_none());
            }
            _ => panic!("expected align"),
        }
    }

    #[test]
    fn test_rewrite_keywords_split_on_commas() {
        let cli = Cli::parse_from(["resume-matcher", "rewrite", "-b", "Built APIs", "-k", "Go,Kafka"]);
        match cli.command {
            Commands::Rewrite { keywords, .. } => assert_eq!(keywords, vec!["Go", "Kafka"]),
            _ => panic!("expected rewrite"),
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_file_extension_validation() {
        let allowed = ["pdf", "txt", "md"];
        assert!(validate_file_extension(Path::new("cv.PDF"), &allowed).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &allowed).is_err());
        assert!(validate_file_extension(Path::new("cv"), &allowed).is_err());
    }

    #[test]
    fn test_job_text_minimum() {
        assert!(validate_job_text("  short  ", 10).is_err());
        assert!(validate_job_text("0123456789", 10).is_ok());
    }
}
