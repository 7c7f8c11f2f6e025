use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::language_utils::{default_languages, validate_language_table, TargetLanguage};
use crate::packaging::ReportFormat;
use crate::pipeline::PipelineConfig;
use crate::providers::anthropic::Anthropic;
use crate::providers::gemini::Gemini;
use crate::providers::{Provider, RetryPolicy};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

/// Configuration file used when none is given
pub const DEFAULT_CONFIG_FILE: &str = "cobmig.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Active LLM provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Settings per provider
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Generation settings shared by every provider
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Languages COBOL sources can be migrated to
    #[serde(default = "default_languages")]
    pub languages: Vec<TargetLanguage>,

    /// Format of the analysis report and the guide
    #[serde(default)]
    pub report_format: ReportFormat,

    /// Directory result archives are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Anthropic
    Anthropic,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

// Implement Display trait for LlmProvider
impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for LlmProvider
impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, falls back to the provider's environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty for the public API
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: LlmProvider) -> Self {
        match provider_type {
            LlmProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                api_key: String::new(),
                endpoint: default_gemini_endpoint(),
                timeout_secs: default_timeout_secs(),
                retry_count: default_retry_count(),
                retry_backoff_ms: default_retry_backoff_ms(),
                rate_limit: default_gemini_rate_limit(),
            },
            LlmProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_timeout_secs(),
                retry_count: default_retry_count(),
                retry_backoff_ms: default_retry_backoff_ms(),
                rate_limit: default_anthropic_rate_limit(),
            },
        }
    }

    /// Retry settings for this provider
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, self.retry_backoff_ms)
    }
}

/// Generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Output token limit for document and program analysis
    #[serde(default = "default_max_tokens")]
    pub analysis_max_tokens: u32,

    /// Output token limit for transcriptions
    #[serde(default = "default_max_tokens")]
    pub transcription_max_tokens: u32,

    /// Output token limit for integration guides
    #[serde(default = "default_max_tokens")]
    pub guide_max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Absent means the provider's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            analysis_max_tokens: default_max_tokens(),
            transcription_max_tokens: default_max_tokens(),
            guide_max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(LlmProvider::Gemini),
        ProviderConfig::new(LlmProvider::Anthropic),
    ]
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_gemini_rate_limit() -> Option<u32> {
    Some(30)
}

fn default_anthropic_rate_limit() -> Option<u32> {
    // Slightly below the standard 50 requests per minute
    Some(45)
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {:?}", path))
        } else {
            warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        validate_language_table(&self.languages)?;

        let generation = &self.generation;
        if generation.analysis_max_tokens == 0
            || generation.transcription_max_tokens == 0
            || generation.guide_max_tokens == 0
        {
            return Err(anyhow!("Token limits must be greater than zero"));
        }

        if let Some(temperature) = generation.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", temperature));
            }
        }

        if self.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (set it in the config or {})",
                self.provider.display_name(),
                self.provider.api_key_env_var()
            ));
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, inserting defaults when absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let idx = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(idx) => idx,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[idx]
    }

    /// Active provider settings, falling back to defaults
    pub fn provider_settings(&self) -> ProviderConfig {
        self.get_active_provider_config()
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(self.provider))
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            LlmProvider::Gemini => default_gemini_model(),
            LlmProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider, then its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        std::env::var(self.provider.api_key_env_var()).unwrap_or_default()
    }

    /// Pipeline settings derived from this configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.get_model())
            .with_token_limits(
                self.generation.analysis_max_tokens,
                self.generation.transcription_max_tokens,
                self.generation.guide_max_tokens,
            )
            .with_temperature(self.generation.temperature)
            .with_languages(self.languages.clone())
    }

    /// Build the client for the active provider
    pub fn build_provider(&self) -> Arc<dyn Provider> {
        let settings = self.provider_settings();
        let api_key = self.get_api_key();
        let model = self.get_model();

        match self.provider {
            LlmProvider::Gemini => Arc::new(Gemini::new_with_config(
                api_key,
                settings.endpoint.clone(),
                model,
                settings.timeout_secs,
                settings.retry_policy(),
                settings.rate_limit,
            )),
            LlmProvider::Anthropic => Arc::new(Anthropic::new_with_config(
                api_key,
                settings.endpoint.clone(),
                model,
                settings.timeout_secs,
                settings.retry_policy(),
                settings.rate_limit,
            )),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            provider: LlmProvider::default(),
            available_providers: default_available_providers(),
            generation: GenerationConfig::default(),
            languages: default_languages(),
            report_format: ReportFormat::default(),
            output_dir: default_output_dir(),
            log_level: LogLevel::default(),
        }
    }
}
