//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.aivisor.toml` files, and the checks that must pass before a run
//! is allowed to start.

use crate::analysis::BrandList;
use crate::client::PromptSet;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".aivisor.toml";

/// Ollama's usual local address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Prompt settings.
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Brands and questions for the run.
    #[serde(default)]
    pub run: RunConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// HTML report path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Detailed results JSON path.
    #[serde(default)]
    pub json_output: Option<String>,

    /// Summary JSON path.
    #[serde(default)]
    pub summary_output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            json_output: None,
            summary_output: None,
            verbose: false,
        }
    }
}

fn default_output() -> String {
    crate::report::DEFAULT_REPORT_FILE.to_string()
}

/// Which backend answers the questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI or a compatible `/chat/completions` server
    #[default]
    Openai,
    /// Ollama `/api/chat`
    Ollama,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Backend to use.
    #[serde(default)]
    pub provider: Provider,

    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Maximum tokens in each response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Pause after a failed request before the next question.
    #[serde(default = "default_failure_pause")]
    pub failure_pause_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            name: default_model(),
            api_base: default_api_base(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_seconds: default_timeout(),
            failure_pause_seconds: default_failure_pause(),
        }
    }
}

impl ModelConfig {
    /// API base actually used; Ollama falls back to its local default
    /// when the OpenAI default was left in place.
    pub fn endpoint(&self) -> String {
        if self.provider == Provider::Ollama && self.api_base == default_api_base() {
            DEFAULT_OLLAMA_URL.to_string()
        } else {
            self.api_base.clone()
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> usize {
    1000
}

fn default_timeout() -> u64 {
    120
}

fn default_failure_pause() -> u64 {
    5
}

/// Prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// System role prompt.
    #[serde(default = "default_system_prompt")]
    pub system: String,

    /// User role prompt; `{question}` is replaced by each question.
    #[serde(default = "default_user_prompt")]
    pub user: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: default_system_prompt(),
            user: default_user_prompt(),
        }
    }
}

fn default_system_prompt() -> String {
    "You are a helpful assistant who provides detailed information about institutional investments"
        .to_string()
}

fn default_user_prompt() -> String {
    "I'm an institutional investor with the following question. {question}".to_string()
}

/// Brand and question lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Brand names to detect.
    #[serde(default = "default_brands")]
    pub brands: Vec<String>,

    /// Questions to ask, in order.
    #[serde(default = "default_questions")]
    pub questions: Vec<String>,

    /// How many questions to process.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            brands: default_brands(),
            questions: default_questions(),
            limit: default_limit(),
        }
    }
}

fn default_brands() -> Vec<String> {
    vec!["BlackRock", "Vanguard", "UBS", "Fidelity", "Goldman Sachs"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_questions() -> Vec<String> {
    vec![
        "How do you evaluate the risk profile of corporate treasurers & cfos?",
        "How do you evaluate the risk profile of endowments & foundations?",
        "What are the key factors to consider when selecting institutional investors?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_limit() -> usize {
    5
}

/// Problems that stop a run before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no questions configured")]
    NoQuestions,

    #[error("question limit must be at least 1")]
    ZeroLimit,

    #[error("missing API key (use --api-key or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("API base must start with 'http://' or 'https://': {0}")]
    InvalidApiBase(String),
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.aivisor.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) -> Result<()> {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref path) = args.json_output {
            self.general.json_output = Some(path.display().to_string());
        }
        if let Some(ref path) = args.summary_output {
            self.general.summary_output = Some(path.display().to_string());
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(provider) = args.provider {
            self.model.provider = provider;
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_base) = args.api_base {
            self.model.api_base = api_base.clone();
        }
        if let Some(max_tokens) = args.max_tokens {
            self.model.max_tokens = max_tokens;
        }
        if args.temperature.is_some() {
            self.model.temperature = args.temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(pause) = args.failure_pause {
            self.model.failure_pause_seconds = pause;
        }

        if let Some(ref system) = args.system_prompt {
            self.prompts.system = system.clone();
        }
        if let Some(ref user) = args.user_prompt {
            self.prompts.user = user.clone();
        }

        if let Some(ref brands) = args.brands {
            self.run.brands = brands.clone();
        }
        if let Some(ref path) = args.brands_file {
            self.run.brands = read_lines(path)?;
        }
        if !args.question.is_empty() {
            self.run.questions = args.question.clone();
        }
        if let Some(ref path) = args.questions_file {
            self.run.questions = read_lines(path)?;
        }
        if let Some(limit) = args.limit {
            self.run.limit = limit;
        }

        Ok(())
    }

    /// Brand list with blanks and duplicates removed.
    pub fn brand_list(&self) -> BrandList {
        BrandList::new(&self.run.brands)
    }

    /// Questions to process: trimmed, blanks skipped, capped at the limit.
    pub fn selected_questions(&self) -> Vec<String> {
        self.run
            .questions
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .take(self.run.limit)
            .map(String::from)
            .collect()
    }

    pub fn prompt_set(&self) -> PromptSet {
        PromptSet::new(self.prompts.system.clone(), self.prompts.user.clone())
    }

    /// Checks that must pass before the first request.
    pub fn validate(&self, api_key: Option<&str>) -> Result<(), ConfigError> {
        if self.run.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.selected_questions().is_empty() {
            return Err(ConfigError::NoQuestions);
        }

        let base = self.model.endpoint();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::InvalidApiBase(base));
        }

        if self.model.provider == Provider::Openai
            && api_key.map(str::trim).unwrap_or_default().is_empty()
        {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Read a list file: one item per line, trimmed, blank lines skipped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
