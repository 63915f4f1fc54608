//! Resume matcher: hybrid resume and job description scoring tool

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_matcher::config::{Config, OutputFormat};
use resume_matcher::error::{Result, ResumeMatcherError};
use resume_matcher::input::file_detector::SUPPORTED_EXTENSIONS;
use resume_matcher::input::InputManager;
use resume_matcher::llm::{GroqClient, SkillGapAnalyzer, TextGenerator};
use resume_matcher::output::formatter::{resolve_report_path, save_report_to_file, ReportGenerator};
use resume_matcher::output::MatchReport;
use resume_matcher::processing::analyzer::{AnalysisEngine, CoreAnalysis};
use resume_matcher::processing::embedding_manager::{resolve_model_id, EmbeddingModelManager};
use resume_matcher::processing::embeddings::EmbeddingEngine;
use resume_matcher::processing::structure::StructureAnalyzer;
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        if e.is_dependency_failure() {
            error!("An external service or model was unavailable; check the network, the model store and the API key");
        }
        process::exit(e.exit_code());
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Align {
            resume,
            job,
            embedding,
            detailed,
            output,
            save,
            no_llm,
            rewrite,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            cli::validate_file_extension(&resume, SUPPORTED_EXTENSIONS)
                .map_err(|e| ResumeMatcherError::InvalidInput(format!("Resume file: {}", e)))?;

            let mut input_manager = InputManager::new();
            let spinner = start_spinner("Extracting text...");
            let resume_text = input_manager.extract_text(&resume).await;
            let job_text = input_manager.read_job_text(&job).await;
            spinner.finish_and_clear();
            let (resume_text, job_text) = (resume_text?, job_text?);

            cli::validate_job_text(&job_text, config.processing.min_job_description_chars)
                .map_err(ResumeMatcherError::InvalidInput)?;
            debug!("Resume: {} chars, job description: {} chars", resume_text.len(), job_text.len());

            let spinner = start_spinner("Scoring match...");
            let analysis = score_match(&config, embedding, resume_text.clone(), job_text.clone()).await;
            spinner.finish_and_clear();

            let job_source = if Path::new(&job).is_file() { job.clone() } else { "inline text".to_string() };
            let mut report = MatchReport::from_analysis(analysis?, &resume.to_string_lossy(), &job_source);

            if no_llm || !config.llm.enabled {
                info!("Skipping skill-gap generation");
                if rewrite.is_some() {
                    report.add_warning("Bullet rewrite needs the generation service; it is disabled");
                }
            } else {
                add_generated_insights(&mut report, &config, &resume_text, &job_text, rewrite.as_deref()).await;
            }

            emit_report(&report, format, detailed || config.output.detailed, save.as_deref(), &config)?;
        }

        Commands::Structure { resume, output } => {
            let format = resolve_format(output.as_deref(), &config)?;
            cli::validate_file_extension(&resume, SUPPORTED_EXTENSIONS)
                .map_err(|e| ResumeMatcherError::InvalidInput(format!("Resume file: {}", e)))?;

            let resume_text = InputManager::new().extract_text(&resume).await?;
            let structure = StructureAnalyzer::new(config.structure.clone())?.analyze_structure(&resume_text);
            let report = MatchReport::structure_only(structure, &resume.to_string_lossy());

            emit_report(&report, format, config.output.detailed, None, &config)?;
        }

        Commands::Rewrite { bullet, keywords } => {
            if bullet.trim().is_empty() {
                return Err(ResumeMatcherError::InvalidInput("Bullet text is empty".to_string()));
            }
            let client = GroqClient::from_env(&config.llm)?;
            let analyzer = SkillGapAnalyzer::new(client, &config.llm);

            let spinner = start_spinner("Rewriting bullet...");
            let rewritten = analyzer.rewrite_bullet(&bullet, &keywords).await;
            spinner.finish_and_clear();

            println!("{}", rewritten?);
        }

        Commands::Models { action } => run_models_command(action, &config).await?,

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| ResumeMatcherError::Configuration(e.to_string()))?;
                println!("⚙️  Configuration ({})\n", config_path.display());
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset: {}", config_path.display());
            }

            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

/// Model loading and scoring are CPU-bound and may block on a hub download.
async fn score_match(
    config: &Config,
    embedding: Option<String>,
    resume_text: String,
    job_text: String,
) -> Result<CoreAnalysis> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        let embedder = EmbeddingEngine::from_config(&config, embedding.as_deref())?;
        let engine = AnalysisEngine::new(&config, embedder)?;
        engine.analyze(&resume_text, &job_text)
    })
    .await
    .map_err(|e| ResumeMatcherError::Embedding(format!("Scoring task failed: {}", e)))?
}

/// Generation failures become report warnings; the deterministic scores stand.
async fn add_generated_insights(
    report: &mut MatchReport,
    config: &Config,
    resume_text: &str,
    job_text: &str,
    rewrite: Option<&str>,
) {
    let client = match GroqClient::from_env(&config.llm) {
        Ok(client) => client,
        Err(e) => {
            warn!("Generation service unavailable: {}", e);
            report.add_warning(format!("Could not extract missing skills: {}", e));
            return;
        }
    };

    report.metadata.generation_model = Some(client.model_name().to_string());
    let analyzer = SkillGapAnalyzer::new(client, &config.llm);

    let spinner = start_spinner("Finding missing skills...");
    let gaps = analyzer.extract_gaps(resume_text, job_text).await;
    spinner.finish_and_clear();
    match gaps {
        Ok(gaps) => report.set_skill_gaps(gaps),
        Err(e) => {
            warn!("Skill-gap extraction failed: {}", e);
            report.add_warning(format!("Could not extract missing skills: {}", e));
        }
    }

    if let Some(bullet) = rewrite.filter(|b| !b.trim().is_empty()) {
        let spinner = start_spinner("Rewriting bullet...");
        let rewritten = analyzer.rewrite_bullet(bullet, &report.missing_skills()).await;
        spinner.finish_and_clear();
        match rewritten {
            Ok(text) => report.set_rewritten_bullet(bullet, text),
            Err(e) => {
                warn!("Bullet rewrite failed: {}", e);
                report.add_warning(format!("Could not rewrite bullet: {}", e));
            }
        }
    }
}

async fn run_models_command(action: ModelAction, config: &Config) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("🧠 Embedding Models ({})\n", manager.models_dir().display());
            for model in manager.list_available_models() {
                let status = if manager.is_model_downloaded(model.id) { "✅ Downloaded" } else { "⬇️  Available" };
                println!("  • {} [{}] - {} MB, {} dims [{}]", model.name, model.id, model.size_mb, model.dimensions, status);
                println!("    {}", model.description);
            }
            let downloaded = manager.list_downloaded_models();
            if downloaded.is_empty() {
                println!("\nNo models downloaded yet");
            } else {
                println!("\nDownloaded: {}", downloaded.join(", "));
            }
            println!("Selected by default: {}", manager.auto_select_model());
        }

        ModelAction::Download { model } => {
            let spinner = start_spinner(&format!("Downloading {}...", model));
            let path = manager.download_model(&model).await;
            spinner.finish_and_clear();
            println!("✅ Model ready at {}", path?.display());
        }

        ModelAction::Info { model } => {
            let info = resolve_model_id(&model).ok_or_else(|| ResumeMatcherError::ModelNotFound(model.clone()))?;
            println!("Name: {}", info.name);
            println!("Id: {}", info.id);
            println!("Repository: {}", info.repo_id);
            println!("Size: {} MB", info.size_mb);
            println!("Dimensions: {}", info.dimensions);
            println!("Description: {}", info.description);
            match manager.get_model_path(info.id) {
                Some(path) => println!("Status: ✅ Downloaded ({})", path.display()),
                None => println!("Status: ⬇️  Not downloaded (resume-matcher models download {})", info.id),
            }
        }
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(ResumeMatcherError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn emit_report(
    report: &MatchReport,
    format: OutputFormat,
    detailed: bool,
    save: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let use_colors = config.output.color_output && save.is_none();
    let generator = ReportGenerator::with_options(use_colors, detailed, true, true);
    let content = generator.generate_report(report, format)?;

    match save {
        Some(target) => {
            let path = resolve_report_path(target, format, &report.metadata.resume_file);
            save_report_to_file(&content, &path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn start_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
