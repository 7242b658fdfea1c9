use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::subtitle_processor::SubtitleTrack;

use super::batch::{BatchReport, BatchSettings, BatchTranslator};

/// Token usage statistics for one translation run
#[derive(Debug, Clone, Default)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Wall time of the run
    pub duration: Duration,
}

impl TokenUsageStats {
    /// Total tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Generate a one-line summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "{} prompt + {} completion tokens in {:.1}s",
            self.prompt_tokens,
            self.completion_tokens,
            self.duration.as_secs_f64()
        )
    }
}

/// Result of translating one track
#[derive(Debug, Clone)]
pub struct TrackTranslation {
    /// Translated cues with the source timing
    pub track: SubtitleTrack,
    /// Attempts and fallbacks per batch
    pub report: BatchReport,
    /// Token usage
    pub usage: TokenUsageStats,
}

/// Translation service: file-level entry point over the batch translator
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Batch translator doing the provider work
    translator: BatchTranslator,

    /// Provider name for log lines
    provider_name: String,

    /// Draw a progress bar while translating
    show_progress: bool,
}

impl TranslationService {
    /// Create a service for the configured provider
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let provider = providers::from_config(config)?;
        Ok(Self::with_provider(provider, BatchSettings::from_config(config)))
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, settings: BatchSettings) -> Self {
        let provider_name = provider.name().to_string();
        Self {
            translator: BatchTranslator::new(provider, settings),
            provider_name,
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check the provider before committing to a translation
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.translator.test_connection().await
    }

    /// Translate a track in memory
    pub async fn translate_track(
        &self,
        track: &SubtitleTrack,
        target_language: &str,
    ) -> Result<TrackTranslation, TranslationError> {
        let start = Instant::now();
        let progress_bar = self.progress_bar(track.len());

        let pb = progress_bar.clone();
        let result = self
            .translator
            .translate_cues(&track.cues, target_language, move |completed, _total| {
                if let Some(pb) = &pb {
                    pb.set_position(completed as u64);
                }
            })
            .await;
        if let Some(pb) = &progress_bar {
            pb.finish_and_clear();
        }
        let (cues, report) = result?;

        let usage = TokenUsageStats {
            prompt_tokens: report.prompt_tokens,
            completion_tokens: report.completion_tokens,
            duration: start.elapsed(),
        };

        Ok(TrackTranslation {
            track: SubtitleTrack::with_cues(track.source_file.clone(), target_language, cues),
            report,
            usage,
        })
    }

    /// Translate a caption file and write `{stem}.{target}.srt` next to it
    ///
    /// The output is written once, after every batch succeeded. On failure no
    /// file is created and the error names the input path.
    pub async fn translate_file<P: AsRef<Path>>(
        &self,
        subtitle_file: P,
        source_language: &str,
        target_language: &str,
    ) -> Result<PathBuf, TranslationError> {
        let subtitle_file = subtitle_file.as_ref();
        let source = SubtitleTrack::read_from_file(subtitle_file, source_language)
            .map_err(|e| TranslationError::from(e).for_file(subtitle_file))?;

        info!(
            "Translating {} cues from {} to {} with {}",
            source.len(),
            subtitle_file.display(),
            target_language,
            self.provider_name
        );

        let translation = self
            .translate_track(&source, target_language)
            .await
            .map_err(|e| e.for_file(subtitle_file))?;

        if !translation.report.fallback_batches.is_empty() {
            info!(
                "{} batch(es) kept their source text",
                translation.report.fallback_batches.len()
            );
        }
        debug!("Token usage: {}", translation.usage.summary());

        let output_path = FileManager::translated_subtitle_path(subtitle_file, target_language);
        translation
            .track
            .write_to_srt(&output_path)
            .map_err(|e| TranslationError::from(e).for_file(subtitle_file))?;

        info!("Translated subtitles written to {}", output_path.display());
        Ok(output_path)
    }

    fn progress_bar(&self, cue_count: usize) -> Option<ProgressBar> {
        if !self.show_progress || cue_count == 0 {
            return None;
        }

        let batch_size = self.translator.settings().batch_size.max(1);
        let total_batches = cue_count.div_ceil(batch_size) as u64;
        let progress_bar = ProgressBar::new(total_batches);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        Some(progress_bar)
    }
}
