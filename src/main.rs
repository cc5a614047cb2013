//! aivisor - AI visibility analyzer
//!
//! A CLI tool that asks a language model a battery of questions, scans
//! each answer for URLs, domains, and brand names, and writes a
//! searchable HTML report of how often each one came up.
//!
//! Exit codes:
//!   0 - Success (at least one question was answered)
//!   1 - Configuration or runtime error (nothing was sent, or output failed)
//!   2 - Every request failed

mod analysis;
mod cli;
mod client;
mod config;
mod models;
mod report;
mod runner;

use analysis::ResponseAnalyzer;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use client::ollama::OllamaConfig;
use client::openai::OpenAiConfig;
use client::{ModelClient, OllamaClient, OpenAiClient};
use config::{Config, Provider};
use models::RunMetadata;
use runner::{BatchRunner, RunOptions};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config errors stop the run before logging or any request
    let config = match load_config(&args, Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(args.log_level(config.general.verbose));

    info!("aivisor v{}", env!("CARGO_PKG_VERSION"));
    debug!("Model override: {:?}", args.model);

    match run_analysis(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .aivisor.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, prompts, brands, and questions.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the question batch and write all outputs. Returns exit code (0 or 2).
async fn run_analysis(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    // Nothing is sent unless these pass
    config.validate(args.api_key.as_deref())?;

    let prompts = config.prompt_set();
    if !prompts.has_placeholder() {
        warn!(
            "User prompt has no {} placeholder; every question will send the same message",
            client::QUESTION_PLACEHOLDER
        );
    }

    let brands = config.brand_list();
    if brands.is_empty() {
        warn!("Brand list is empty; only URLs and domains will be counted");
    }
    let analyzer = ResponseAnalyzer::new(brands.clone())?;
    let questions = config.selected_questions();
    let client = build_client(&config, args.api_key.as_deref())?;

    println!("🤖 Querying model...");
    println!("   Model: {}", config.model.name);
    println!("   API: {}", config.model.endpoint());
    println!("   Questions: {}", questions.len());
    println!("   Brands: {}", brands.len());

    let options = RunOptions {
        failure_pause: Duration::from_secs(config.model.failure_pause_seconds),
        show_progress: !args.quiet,
    };
    let outcome = BatchRunner::new(client.as_ref(), &analyzer, &prompts, options)
        .run(&questions)
        .await;

    println!("\n📝 Generating report...");

    let metadata = RunMetadata {
        model: client.model().to_string(),
        system_prompt: prompts.system.clone(),
        user_prompt: prompts.user_template.clone(),
        questions: questions.clone(),
        generated_at: Utc::now(),
    };

    let document = report::render_html(&outcome.entries, &outcome.counts, &brands, &metadata);
    debug!(
        "Rendered {} report ({} bytes)",
        document.media_type,
        document.content.len()
    );
    let output = if config.general.output.trim().is_empty() {
        document.filename.clone()
    } else {
        config.general.output.clone()
    };
    let output = Path::new(&output);
    document.write_to(output)?;

    if let Some(ref path) = config.general.json_output {
        let json = report::generate_results_json(&outcome.entries)?;
        report::write_output(Path::new(path), &json)?;
        info!("Detailed results written to {}", path);
    }

    let summary = report::build_summary(&outcome.entries, &outcome.counts, &metadata);
    if let Some(ref path) = config.general.summary_output {
        let json = report::generate_summary_json(&summary)?;
        report::write_output(Path::new(path), &json)?;
        info!("Summary written to {}", path);
    }

    // Print summary
    println!("\n📊 Top Mentioned Brands:");
    let top = outcome.counts.top_brands();
    if top.is_empty() {
        println!("   (none)");
    }
    for (brand, count) in top {
        println!("   {:<24} {}", brand, count);
    }
    println!(
        "\n   Answered: {} | Failed: {} | Domains: {}",
        summary.total_processed,
        summary.failed,
        summary.domain_counts.len()
    );
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Report saved to: {}", output.display());

    if summary.total_processed == 0 {
        eprintln!("\n⛔ No question received a response (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Build the backend selected in the config.
fn build_client(config: &Config, api_key: Option<&str>) -> Result<Box<dyn ModelClient>> {
    let model = &config.model;

    let client: Box<dyn ModelClient> = match model.provider {
        Provider::Openai => Box::new(OpenAiClient::new(OpenAiConfig {
            api_base: model.endpoint(),
            api_key: api_key.unwrap_or_default().to_string(),
            model: model.name.clone(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            timeout_seconds: model.timeout_seconds,
        })?),
        Provider::Ollama => Box::new(OllamaClient::new(OllamaConfig {
            ollama_url: model.endpoint(),
            model: model.name.clone(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            timeout_seconds: model.timeout_seconds,
        })?),
    };

    Ok(client)
}

/// Load configuration and apply CLI overrides.
///
/// An explicit `--config` must exist; otherwise `.aivisor.toml` in `dir` is
/// used when present. A file that exists but can't be parsed is an error.
fn load_config(args: &Args, dir: &Path) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_from_dir(dir)?.unwrap_or_default(),
    };
    config.merge_with_args(args)?;

    Ok(config)
}
