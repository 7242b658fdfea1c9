use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::bilingual::style::{LayerStyle, StylePair};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings. Every component receives
/// the part of the configuration it needs explicitly.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (BCP-47 style, e.g. "zh-CN")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Bilingual rendering config
    #[serde(default)]
    pub bilingual: BilingualConfig,

    /// Download and transcoding config
    #[serde(default)]
    pub media: MediaConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI-compatible chat completions
    #[default]
    OpenAI,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// What happens to a batch whose retry budget is used up
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedPolicy {
    /// Abort the whole file translation
    #[default]
    Fail,
    /// Keep the source text for the failed batch and carry on
    KeepOriginal,
}

/// How the subtitle ends up in the video
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    /// Selectable subtitle stream
    Soft,
    /// Rendered into the picture
    #[default]
    Hard,
}

impl std::str::FromStr for EmbedType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            _ => Err(anyhow!("Invalid embed type: {}", s)),
        }
    }
}

/// Retry budget and backoff curve for translation batches
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    // @field: Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Delay before the first retry, doubled on each further retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    // @field: Upper bound of the doubled delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    // @field: Random extra delay in [0, jitter_ms]
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    // @field: Model name, empty means the provider default
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty means the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token limit
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of cues sent per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retry budget and backoff
    #[serde(default)]
    pub retry: RetryConfig,

    /// Policy once a batch has exhausted its retries
    #[serde(default)]
    pub on_exhausted: ExhaustedPolicy,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            batch_size: default_batch_size(),
            retry: RetryConfig::default(),
            on_exhausted: ExhaustedPolicy::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }
}

/// Styling for the two subtitle layers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BilingualConfig {
    /// Produce two-layer output when a source-language track is available
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Font family written into the ASS style table
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// Translated (top) layer
    #[serde(default = "LayerStyle::primary")]
    pub primary: LayerStyle,

    /// Source-language (bottom) layer
    #[serde(default = "LayerStyle::secondary")]
    pub secondary: LayerStyle,

    /// ASS numpad alignment, 2 is bottom centre
    #[serde(default = "default_alignment")]
    pub alignment: u8,
}

impl Default for BilingualConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_name: default_font_name(),
            primary: LayerStyle::primary(),
            secondary: LayerStyle::secondary(),
            alignment: default_alignment(),
        }
    }
}

impl BilingualConfig {
    // @returns: Style pair used by the composer
    pub fn style_pair(&self) -> StylePair {
        StylePair {
            font_name: self.font_name.clone(),
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            alignment: self.alignment,
        }
    }
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    // @field: ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    // @field: yt-dlp binary
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: String,

    // @field: Where downloads land
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    // @field: Caption languages requested from the site
    #[serde(default = "default_subtitle_languages")]
    pub subtitle_languages: Vec<String>,

    // @field: Soft or hard embedding
    #[serde(default)]
    pub embed_type: EmbedType,

    // @field: Transcoder timeout
    #[serde(default = "default_transcode_timeout_secs")]
    pub transcode_timeout_secs: u64,

    // @field: Download timeout
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            yt_dlp_path: default_yt_dlp_path(),
            download_dir: default_download_dir(),
            subtitle_languages: default_subtitle_languages(),
            embed_type: EmbedType::default(),
            transcode_timeout_secs: default_transcode_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_target_language() -> String {
    "zh-CN".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_batch_size() -> usize {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    16_000
}

fn default_jitter_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_alignment() -> u8 {
    2
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_yt_dlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_subtitle_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_transcode_timeout_secs() -> u64 {
    2 * 60 * 60
}

fn default_download_timeout_secs() -> u64 {
    30 * 60
}

impl Config {
    /// Load the config file, or write a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognised keys: OPENAI_API_KEY, OPENAI_BASE_URL, TRANSLATION_MODEL,
    /// TARGET_LANGUAGE, DOWNLOAD_DIR, FFMPEG_PATH. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = get("OPENAI_API_KEY") {
            self.translation.api_key = api_key;
        }
        if let Some(endpoint) = get("OPENAI_BASE_URL") {
            self.translation.endpoint = endpoint;
        }
        if let Some(model) = get("TRANSLATION_MODEL") {
            self.translation.model = model;
        }
        if let Some(language) = get("TARGET_LANGUAGE") {
            self.target_language = language;
        }
        if let Some(dir) = get("DOWNLOAD_DIR") {
            self.media.download_dir = PathBuf::from(dir);
        }
        if let Some(ffmpeg) = get("FFMPEG_PATH") {
            self.media.ffmpeg_path = ffmpeg;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_tag(&self.target_language)?;

        let translation = &self.translation;
        if translation.batch_size == 0 {
            return Err(anyhow!("translation.batch_size must be at least 1"));
        }

        if !(0.0..=2.0).contains(&translation.temperature) {
            return Err(anyhow!(
                "translation.temperature must be between 0 and 2, got {}",
                translation.temperature
            ));
        }

        let endpoint = translation.get_endpoint();
        url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", endpoint))?;

        if translation.provider == TranslationProvider::OpenAI && translation.api_key.is_empty() {
            return Err(anyhow!(
                "Translation API key is required for OpenAI provider (set OPENAI_API_KEY)"
            ));
        }

        if translation.retry.max_delay_ms < translation.retry.base_delay_ms {
            return Err(anyhow!(
                "translation.retry.max_delay_ms ({}) is smaller than base_delay_ms ({})",
                translation.retry.max_delay_ms,
                translation.retry.base_delay_ms
            ));
        }

        if self.media.subtitle_languages.is_empty() {
            return Err(anyhow!("media.subtitle_languages must not be empty"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            bilingual: BilingualConfig::default(),
            media: MediaConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
