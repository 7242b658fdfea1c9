use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, EmbedType};
use crate::bilingual::{self, StylePair};
use crate::file_utils::{FileManager, VideoOutputKind};
use crate::language_utils;
use crate::media::{Acquirer, FfmpegTranscoder, Transcoder, YtDlpDownloader};
use crate::subtitle_processor::SubtitleTrack;
use crate::timing::{self, DEFAULT_EPSILON_MS, DEFAULT_TOLERANCE_MS};
use crate::translation::TranslationService;

// @module: Application controller for the download, translate and embed workflow

/// Language assumed for caption files given on the command line
const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Subtitle files chosen for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePlan {
    // @field: Track in the target language, drawn as the main line
    pub primary: PathBuf,

    // @field: Source-language track drawn under it, when bilingual
    pub secondary: Option<PathBuf>,

    // @field: Whether `primary` was produced by translation
    pub translated: bool,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Video and caption downloader
    acquirer: Arc<dyn Acquirer>,

    // @field: Muxer and burner
    transcoder: Arc<dyn Transcoder>,

    // @field: Caption translator
    translation_service: TranslationService,
}

impl Controller {
    // @method: Create a controller with the real tools described by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let translation_service = TranslationService::new(&config.translation)
            .context("Failed to create translation service")?
            .with_progress(true);
        let acquirer = Arc::new(YtDlpDownloader::from_config(&config.media));
        let transcoder = Arc::new(FfmpegTranscoder::from_config(&config.media));

        Ok(Self::with_components(config, acquirer, transcoder, translation_service))
    }

    /// Create a controller around explicit collaborators
    pub fn with_components(
        config: Config,
        acquirer: Arc<dyn Acquirer>,
        transcoder: Arc<dyn Transcoder>,
        translation_service: TranslationService,
    ) -> Self {
        Self {
            config,
            acquirer,
            transcoder,
            translation_service,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Download a video with its captions, then translate and embed them
    pub async fn run_url(&self, url: &str, output: Option<PathBuf>) -> Result<PathBuf> {
        let start_time = Instant::now();

        let download = self
            .acquirer
            .fetch(url)
            .await
            .with_context(|| format!("Failed to download {}", url))?;
        info!("Video downloaded: {}", download.title);

        if download.subtitles.is_empty() {
            return Err(anyhow!(
                "No subtitle files were downloaded for '{}'",
                download.title
            ));
        }
        debug!(
            "Available subtitle languages: {}",
            download.subtitles.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        let plan = self.plan_downloaded(&download.subtitles).await?;
        let final_video = self.render(&download.video_file, &plan, output).await?;

        info!(
            "Processing complete in {}: {}",
            Self::format_duration(start_time.elapsed()),
            final_video.display()
        );
        Ok(final_video)
    }

    /// Translate and embed a caption file into an existing video
    pub async fn run_existing(
        &self,
        video_file: &Path,
        subtitle_file: &Path,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();

        if !FileManager::file_exists(video_file) {
            return Err(anyhow!("Video file does not exist: {}", video_file.display()));
        }
        if !FileManager::file_exists(subtitle_file) {
            return Err(anyhow!("Subtitle file does not exist: {}", subtitle_file.display()));
        }

        let plan = self.plan_existing(subtitle_file).await?;
        let final_video = self.render(video_file, &plan, output).await?;

        info!(
            "Processing complete in {}: {}",
            Self::format_duration(start_time.elapsed()),
            final_video.display()
        );
        Ok(final_video)
    }

    /// Choose tracks from downloaded captions, translating when needed
    ///
    /// A caption already in the target language is used as is. Otherwise the
    /// English caption, or the first one available, is translated.
    pub async fn plan_downloaded(&self, subtitles: &BTreeMap<String, PathBuf>) -> Result<SubtitlePlan> {
        let target = &self.config.target_language;
        let existing_target = subtitles
            .iter()
            .find(|(lang, _)| language_utils::language_codes_match(lang, target));
        let source = subtitles
            .iter()
            .find(|(lang, _)| language_utils::is_english(lang))
            .or_else(|| subtitles.iter().find(|(lang, _)| !language_utils::language_codes_match(lang, target)));

        match (existing_target, source) {
            (Some((lang, path)), source) => {
                info!("Using existing {} subtitles, translation skipped", lang);
                Ok(SubtitlePlan {
                    primary: path.clone(),
                    secondary: self.secondary_track(source.map(|(_, p)| p.as_path())),
                    translated: false,
                })
            }
            (None, Some((lang, path))) => {
                let translated = self.translate(path, lang).await?;
                Ok(SubtitlePlan {
                    primary: translated,
                    secondary: self.secondary_track(Some(path.as_path())),
                    translated: true,
                })
            }
            (None, None) => Err(anyhow!("No usable subtitle track found")),
        }
    }

    /// Choose tracks for a caption file given by path
    ///
    /// The file is taken as English. It is translated unless the target is
    /// English too.
    pub async fn plan_existing(&self, subtitle_file: &Path) -> Result<SubtitlePlan> {
        if language_utils::is_english(&self.config.target_language) {
            info!("Target language is English, translation skipped");
            return Ok(SubtitlePlan {
                primary: subtitle_file.to_path_buf(),
                secondary: None,
                translated: false,
            });
        }

        let translated = self.translate(subtitle_file, DEFAULT_SOURCE_LANGUAGE).await?;
        Ok(SubtitlePlan {
            primary: translated,
            secondary: self.secondary_track(Some(subtitle_file)),
            translated: true,
        })
    }

    fn secondary_track(&self, source: Option<&Path>) -> Option<PathBuf> {
        if self.config.bilingual.enabled {
            source.map(Path::to_path_buf)
        } else {
            None
        }
    }

    async fn translate(&self, subtitle_file: &Path, source_language: &str) -> Result<PathBuf> {
        info!(
            "🚀 Translating {} with {} - {}",
            subtitle_file.display(),
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        self.translation_service.test_connection().await.with_context(|| {
            format!(
                "Translation provider {} is not reachable at {}",
                self.config.translation.provider.display_name(),
                self.config.translation.get_endpoint()
            )
        })?;

        let translated = self
            .translation_service
            .translate_file(subtitle_file, source_language, &self.config.target_language)
            .await?;
        Ok(translated)
    }

    /// Produce the final video for a plan with the configured embed type
    pub async fn render(&self, video_file: &Path, plan: &SubtitlePlan, output: Option<PathBuf>) -> Result<PathBuf> {
        let styles = self.config.bilingual.style_pair();

        match self.transcoder.inspect(video_file).await {
            Ok(media) => debug!(
                "Input video: duration {}, resolution {}, audio {}",
                media.duration.as_deref().unwrap_or("?"),
                media.resolution.as_deref().unwrap_or("?"),
                media.audio_sample_rate.as_deref().unwrap_or("?")
            ),
            Err(e) => debug!("Could not inspect {}: {}", video_file.display(), e),
        }

        match self.config.media.embed_type {
            EmbedType::Soft => self.render_soft(video_file, plan, output, &styles).await,
            EmbedType::Hard => self.render_hard(video_file, plan, output, &styles).await,
        }
    }

    async fn render_soft(
        &self,
        video_file: &Path,
        plan: &SubtitlePlan,
        output: Option<PathBuf>,
        styles: &StylePair,
    ) -> Result<PathBuf> {
        let primary = SubtitleTrack::read_from_file(&plan.primary, &self.config.target_language)?;
        let secondary = match &plan.secondary {
            Some(path) => SubtitleTrack::read_from_file(path, DEFAULT_SOURCE_LANGUAGE)?.cues,
            None => Vec::new(),
        };

        let aligned = timing::align(&primary.cues, &secondary, DEFAULT_TOLERANCE_MS);
        let unmatched = aligned.iter().filter(|cue| !cue.has_secondary()).count();
        if !secondary.is_empty() && unmatched > 0 {
            debug!("{} of {} cues have no secondary line", unmatched, aligned.len());
        }

        let document = bilingual::write_document(&plan.primary, &aligned, styles, plan.secondary.is_some())?;
        info!("Subtitle document written to {}", document.display());

        let kind = if plan.secondary.is_some() {
            VideoOutputKind::Bilingual
        } else {
            VideoOutputKind::SoftSubtitles
        };
        let output = output.unwrap_or_else(|| FileManager::video_output_path(video_file, kind));
        if !FfmpegTranscoder::keeps_ass_styling(&output) {
            warn!(
                "{} stores subtitles as {}, font sizes and colours are dropped; use an .mkv output (-o) to keep them",
                output.display(),
                FfmpegTranscoder::subtitle_codec_for(&output)
            );
        }
        let language_code = language_utils::metadata_language_code(&self.config.target_language)
            .unwrap_or_else(|e| {
                warn!("{}, tagging subtitle stream as undetermined", e);
                "und".to_string()
            });

        let final_video = self
            .transcoder
            .embed_soft(video_file, &document, &output, &language_code)
            .await?;
        Ok(final_video)
    }

    async fn render_hard(
        &self,
        video_file: &Path,
        plan: &SubtitlePlan,
        output: Option<PathBuf>,
        styles: &StylePair,
    ) -> Result<PathBuf> {
        let primary = Self::write_deoverlapped(&plan.primary, &self.config.target_language)?;
        let secondary = match &plan.secondary {
            Some(path) => Some(Self::write_deoverlapped(path, DEFAULT_SOURCE_LANGUAGE)?),
            None => None,
        };

        let filter = bilingual::build_filter(&primary, secondary.as_deref(), styles);

        let kind = if secondary.is_some() {
            VideoOutputKind::Bilingual
        } else if language_utils::is_english(&self.config.target_language) {
            VideoOutputKind::English
        } else {
            VideoOutputKind::Burned
        };
        let output = output.unwrap_or_else(|| FileManager::video_output_path(video_file, kind));

        let final_video = self.transcoder.burn(video_file, &filter, &output).await?;
        Ok(final_video)
    }

    /// Write an overlap-free copy of a track next to it and return its path
    fn write_deoverlapped(subtitle_file: &Path, language: &str) -> Result<PathBuf> {
        let track = SubtitleTrack::read_from_file(subtitle_file, language)?;
        let outcome = timing::deoverlap(&track.cues, DEFAULT_EPSILON_MS);
        if outcome.adjusted > 0 {
            info!(
                "Trimmed {} overlapping cue(s) in {}",
                outcome.adjusted,
                subtitle_file.display()
            );
        }

        let output = FileManager::deoverlapped_path(subtitle_file);
        SubtitleTrack::with_cues(track.source_file, language, outcome.cues).write_to_srt(&output)?;
        Ok(output)
    }

    /// Format a duration in a human-readable form
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
