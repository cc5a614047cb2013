//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::Provider;
use clap::Parser;
use std::path::PathBuf;

/// aivisor - see which brands and sites an LLM recommends
///
/// Sends a list of questions to a language model, scans every answer for
/// URLs, domains, and brand names, and writes a searchable HTML report.
///
/// Examples:
///   aivisor --questions-file questions.txt --brands "BlackRock,Vanguard"
///   aivisor --provider ollama --api-base http://localhost:11434 --model llama3.2:latest
///   aivisor --config team.toml --json-output results.json --summary-output summary.json
///   aivisor --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// API key for the OpenAI-compatible backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Backend that answers the questions
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<Provider>,

    /// Model to query (e.g. gpt-4o, gpt-4o-mini, gpt-4.1, gpt-3.5-turbo)
    #[arg(short, long, env = "AIVISOR_MODEL")]
    pub model: Option<String>,

    /// Base URL of the model API
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// System role prompt
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// User role prompt; `{question}` is replaced by each question
    #[arg(long, value_name = "TEXT")]
    pub user_prompt: Option<String>,

    /// Brand names to detect (comma-separated)
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub brands: Option<Vec<String>>,

    /// File with one brand name per line
    #[arg(long, value_name = "FILE", conflicts_with = "brands")]
    pub brands_file: Option<PathBuf>,

    /// Question to ask (repeatable)
    #[arg(long, value_name = "TEXT")]
    pub question: Vec<String>,

    /// File with one question per line
    #[arg(long, value_name = "FILE", conflicts_with = "question")]
    pub questions_file: Option<PathBuf>,

    /// Number of questions to analyze
    #[arg(short, long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Maximum tokens per response
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<usize>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds to wait after a failed request
    #[arg(long, value_name = "SECS")]
    pub failure_pause: Option<u64>,

    /// Output file path for the HTML report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write detailed results as JSON
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aivisor.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .aivisor.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        for path in [&self.brands_file, &self.questions_file].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("File does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file;
    /// `--quiet` overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["aivisor"])
    }

    #[test]
    fn test_parse_lists() {
        let args = Args::parse_from([
            "aivisor",
            "--brands",
            "Acme,Globex",
            "--question",
            "Q1?",
            "--question",
            "Q2?",
            "--provider",
            "ollama",
            "--limit",
            "1",
        ]);

        assert_eq!(args.brands, Some(vec!["Acme".to_string(), "Globex".to_string()]));
        assert_eq!(args.question, vec!["Q1?", "Q2?"]);
        assert_eq!(args.provider, Some(Provider::Ollama));
        assert_eq!(args.limit, Some(1));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.temperature = Some(3.0);
        assert!(args.validate().is_err());

        args.temperature = None;
        args.limit = Some(0);
        assert!(args.validate().is_err());

        args.limit = None;
        args.questions_file = Some(PathBuf::from("/definitely/not/here.txt"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
