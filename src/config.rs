//! TOML configuration for docqa.
//!
//! Every section is optional; missing keys fall back to the `default_*`
//! functions below. [`load_config`] parses and validates a file,
//! [`Config::minimal`] gives the defaults when no file exists.

use anyhow::{Context, Result};
use docqa_core::language::Language;
use docqa_core::rank::Strategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_output_length")]
    pub max_output_length: usize,
    #[serde(default)]
    pub language: Language,
    /// Replace non-ASCII characters in loaded documents with spaces.
    #[serde(default)]
    pub clean_non_ascii: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            top_k: default_top_k(),
            max_output_length: default_max_output_length(),
            language: Language::default(),
            clean_non_ascii: false,
        }
    }
}

fn default_top_k() -> usize {
    docqa_core::rank::DEFAULT_TOP_K
}
fn default_max_output_length() -> usize {
    docqa_core::budget::DEFAULT_MAX_OUTPUT_LENGTH
}

#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    /// Prompt sent to the generator. `{question}` and `{context}` are
    /// substituted.
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Translate non-ASCII prompt chunks to English before generation.
    #[serde(default)]
    pub translate_non_ascii: bool,
    /// Feed the question plus the combined answer back for a second pass.
    #[serde(default)]
    pub refine: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            chunk_size: default_chunk_size(),
            translate_non_ascii: false,
            refine: false,
        }
    }
}

pub const DEFAULT_TEMPLATE: &str = "Answer the question using only the context below. \
If the context does not contain the answer, say so.\n\n\
Question: {question}\n\nContext:\n{context}";

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}
fn default_chunk_size() -> usize {
    docqa_core::chunk::DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_failure_sentinel")]
    pub failure_sentinel: String,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Total calls per prompt. `0` retries until answered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            model: default_model(),
            base_url: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            failure_sentinel: default_failure_sentinel(),
            backoff_secs: default_backoff_secs(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_disabled() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "llama3.1".to_string()
}
fn default_max_tokens() -> u32 {
    800
}
fn default_failure_sentinel() -> String {
    docqa_core::dispatch::DEFAULT_SENTINEL.to_string()
}
fn default_backoff_secs() -> u64 {
    5
}
fn default_max_attempts() -> u32 {
    5
}
fn default_generator_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Language code the final answer is translated into. Empty disables it.
    #[serde(default)]
    pub output_language: String,
    /// Translate the question to English before ranking and prompting.
    #[serde(default)]
    pub translate_question: bool,
    /// Translate the whole document to English at load time.
    #[serde(default)]
    pub translate_document: bool,
    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            base_url: None,
            output_language: String::new(),
            translate_question: false,
            translate_document: false,
            timeout_secs: default_translation_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_translation_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Where the final answer is written. Unset disables the checkpoint.
    #[serde(default)]
    pub response_path: Option<PathBuf>,
    #[serde(default)]
    pub translated_response_path: Option<PathBuf>,
    /// Where the translated document text is written after loading.
    #[serde(default)]
    pub translated_document_path: Option<PathBuf>,
}

impl Config {
    /// All defaults: lexical retrieval, no generator, no translation, no
    /// output files.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::minimal())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Check value ranges and provider names.
pub fn validate(config: &Config) -> Result<()> {
    // Validate retrieval
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be > 0");
    }

    // Validate prompt
    if config.prompt.chunk_size == 0 {
        anyhow::bail!("prompt.chunk_size must be > 0");
    }
    if !config.prompt.template.contains("{context}") {
        anyhow::bail!("prompt.template must contain a {{context}} placeholder");
    }

    // Validate generator
    if !(0.0..=2.0).contains(&config.generator.temperature) {
        anyhow::bail!("generator.temperature must be in [0.0, 2.0]");
    }
    if config.generator.max_tokens == 0 {
        anyhow::bail!("generator.max_tokens must be > 0");
    }
    if config.generator.is_enabled() && config.generator.failure_sentinel.trim().is_empty() {
        anyhow::bail!("generator.failure_sentinel must not be empty");
    }
    match config.generator.provider.as_str() {
        "disabled" | "ollama" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generator provider: '{}'. Must be disabled, ollama, or openai.",
            other
        ),
    }

    // Validate translation
    match config.translation.provider.as_str() {
        "disabled" | "libretranslate" => {}
        other => anyhow::bail!(
            "Unknown translation provider: '{}'. Must be disabled or libretranslate.",
            other
        ),
    }
    if !config.translation.output_language.is_empty() && !config.translation.is_enabled() {
        anyhow::bail!("translation.output_language is set but translation.provider is disabled");
    }
    if (config.translation.translate_question || config.translation.translate_document)
        && !config.translation.is_enabled()
    {
        anyhow::bail!("input translation needs an enabled translation.provider");
    }

    Ok(())
}
