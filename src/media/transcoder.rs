use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;

use super::{capture_tool, run_tool, summarize_ffmpeg_stderr};

static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration: (\d+:\d+:\d+\.\d+)").unwrap());
static RESOLUTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{2,5}x\d{2,5})\b").unwrap());
static SAMPLE_RATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+ Hz)").unwrap());

/// Facts about a media file read from the transcoder's banner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    /// `HH:MM:SS.cc` as printed by ffmpeg
    pub duration: Option<String>,
    /// `WIDTHxHEIGHT` of the first video stream
    pub resolution: Option<String>,
    /// Sample rate of the first audio stream, e.g. `44100 Hz`
    pub audio_sample_rate: Option<String>,
}

/// Operations the pipeline needs from a transcoder
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Mux a subtitle file into the video as a selectable stream
    async fn embed_soft(
        &self,
        video: &Path,
        subtitle: &Path,
        output: &Path,
        language_code: &str,
    ) -> Result<PathBuf, MediaError>;

    /// Re-encode the video with a subtitle filter expression
    async fn burn(&self, video: &Path, filter: &str, output: &Path) -> Result<PathBuf, MediaError>;

    /// Best-effort inspection of a media file
    async fn inspect(&self, video: &Path) -> Result<MediaInfo, MediaError>;
}

/// ffmpeg-backed transcoder
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            Duration::from_secs(config.transcode_timeout_secs),
        )
    }

    /// Subtitle codec for the output container
    ///
    /// Matroska keeps ASS styling; MP4 and MOV only carry `mov_text`.
    pub fn subtitle_codec_for(output: &Path) -> &'static str {
        let ext = output
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mkv" => "ass",
            _ => "mov_text",
        }
    }

    /// True when the output container carries the ASS override tags as written
    pub fn keeps_ass_styling(output: &Path) -> bool {
        Self::subtitle_codec_for(output) == "ass"
    }

    /// Argument list for a soft mux
    pub fn soft_embed_args(video: &Path, subtitle: &Path, output: &Path, language_code: &str) -> Vec<String> {
        vec![
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-i".to_string(),
            subtitle.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-c:s".to_string(),
            Self::subtitle_codec_for(output).to_string(),
            "-metadata:s:s:0".to_string(),
            format!("language={}", language_code),
            output.to_string_lossy().to_string(),
            "-y".to_string(),
        ]
    }

    /// Argument list for burning a filter into the picture
    pub fn burn_args(video: &Path, filter: &str, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vf".to_string(),
            filter.to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
            "-y".to_string(),
        ]
    }

    async fn run(&self, args: Vec<String>) -> Result<(), MediaError> {
        match run_tool(&self.ffmpeg_path, &args, self.timeout).await {
            Ok(_) => Ok(()),
            Err(e) => {
                if let MediaError::ToolFailed { stderr, .. } = &e {
                    error!("ffmpeg failed: {}", summarize_ffmpeg_stderr(stderr));
                }
                Err(e)
            }
        }
    }
}

fn require_file(path: &Path) -> Result<(), MediaError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MediaError::MissingInput(path.to_path_buf()))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn embed_soft(
        &self,
        video: &Path,
        subtitle: &Path,
        output: &Path,
        language_code: &str,
    ) -> Result<PathBuf, MediaError> {
        require_file(video)?;
        require_file(subtitle)?;

        info!("Embedding {} into {}", subtitle.display(), video.display());
        self.run(Self::soft_embed_args(video, subtitle, output, language_code))
            .await?;

        info!("Video with subtitles written to {}", output.display());
        Ok(output.to_path_buf())
    }

    async fn burn(&self, video: &Path, filter: &str, output: &Path) -> Result<PathBuf, MediaError> {
        require_file(video)?;

        info!("Burning subtitles into {}", video.display());
        debug!("Filter: {}", filter);
        self.run(Self::burn_args(video, filter, output)).await?;

        info!("Video with burned subtitles written to {}", output.display());
        Ok(output.to_path_buf())
    }

    async fn inspect(&self, video: &Path) -> Result<MediaInfo, MediaError> {
        require_file(video)?;

        // `ffmpeg -i` without an output exits non-zero but still prints the banner
        let args = ["-hide_banner".to_string(), "-i".to_string(), video.to_string_lossy().to_string()];
        let output = capture_tool(&self.ffmpeg_path, &args, self.timeout).await?;
        Ok(parse_media_info(&String::from_utf8_lossy(&output.stderr)))
    }
}

/// Pull duration, resolution and sample rate out of `ffmpeg -i` stderr
pub fn parse_media_info(stderr: &str) -> MediaInfo {
    let mut info = MediaInfo::default();

    for line in stderr.lines() {
        if line.contains("Duration:") {
            if info.duration.is_none() {
                info.duration = DURATION_REGEX.captures(line).map(|c| c[1].to_string());
            }
        } else if line.contains("Stream") && line.contains("Video:") {
            if info.resolution.is_none() {
                info.resolution = RESOLUTION_REGEX.captures(line).map(|c| c[1].to_string());
            }
        } else if line.contains("Stream") && line.contains("Audio:") && info.audio_sample_rate.is_none() {
            info.audio_sample_rate = SAMPLE_RATE_REGEX.captures(line).map(|c| c[1].to_string());
        }
    }

    info
}
