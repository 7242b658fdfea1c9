use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::app_config::MediaConfig;
use crate::errors::MediaError;
use crate::file_utils::{sanitize_file_name, FileManager};
use crate::language_utils;

use super::run_tool;

const SUBTITLE_EXTENSIONS: &[&str] = &["vtt", "srt"];

/// What the downloader produced for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub title: String,
    pub video_file: PathBuf,
    /// Caption files keyed by language tag, e.g. `en` or `zh-Hans`
    pub subtitles: BTreeMap<String, PathBuf>,
}

/// Fetches a video and its captions
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DownloadResult, MediaError>;
}

/// yt-dlp-backed downloader
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    yt_dlp_path: String,
    download_dir: PathBuf,
    subtitle_languages: Vec<String>,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            download_dir: config.download_dir.clone(),
            subtitle_languages: config.subtitle_languages.clone(),
            timeout: Duration::from_secs(config.download_timeout_secs),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Argument list for one download
    ///
    /// The title and final file path are printed once the file is in place,
    /// one per line, so they can be read back from stdout.
    pub fn download_args(&self, url: &str) -> Vec<String> {
        let template = self.download_dir.join("%(title)s.%(ext)s");
        vec![
            "--no-playlist".to_string(),
            "-f".to_string(),
            "best[ext=mp4]/bestvideo+bestaudio/best".to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            self.subtitle_languages.join(","),
            "--sub-format".to_string(),
            "srt/vtt/best".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:title".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.to_string(),
        ]
    }
}

fn validate_url(url: &str) -> Result<(), MediaError> {
    let parsed = url::Url::parse(url).map_err(|e| MediaError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MediaError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Read `(title, filepath)` from the last two printed lines
fn parse_printed_paths(stdout: &str) -> Option<(String, PathBuf)> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    match lines.as_slice() {
        [.., title, path] => Some((title.to_string(), PathBuf::from(path))),
        _ => None,
    }
}

/// Locate a downloaded video by its title when stdout gave no usable path
fn find_video_by_title(dir: &Path, title: &str) -> Option<PathBuf> {
    let wanted = [title.to_string(), sanitize_file_name(title)];
    let entries = std::fs::read_dir(dir).ok()?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| FileManager::is_video_file(path))
        .filter(|path| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .is_some_and(|stem| wanted.contains(&stem))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Find caption files named `{stem}.{lang}.{srt|vtt}` in `dir`
///
/// Both the raw and the sanitised stem are tried. When a language exists as
/// SRT and VTT the SRT file wins. A translation written by an earlier run,
/// `{stem}.{src}.{target}.srt`, is listed under `target` unless a caption was
/// downloaded for that language.
pub fn find_subtitle_files(dir: &Path, stem: &str) -> anyhow::Result<BTreeMap<String, PathBuf>> {
    let prefixes = [format!("{}.", stem), format!("{}.", sanitize_file_name(stem))];
    let mut found = BTreeMap::new();
    let mut translated = BTreeMap::new();

    // vtt first so srt overwrites it
    for ext in SUBTITLE_EXTENSIONS {
        for path in FileManager::find_files(dir, ext)? {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            let Some(without_ext) = name.strip_suffix(&format!(".{}", ext)) else {
                continue;
            };
            let Some(language) = prefixes
                .iter()
                .find_map(|prefix| without_ext.strip_prefix(prefix.as_str()))
                .filter(|lang| !lang.is_empty())
            else {
                continue;
            };

            match language.split_once('.') {
                None => {
                    found.insert(language.to_string(), path.clone());
                }
                Some((source, target)) if is_translation_suffix(source, target) => {
                    translated.insert(target.to_string(), path.clone());
                }
                Some(_) => {}
            }
        }
    }

    // Output of an earlier run, e.g. `Talk.en.zh-CN.srt`, stands in for a
    // missing target track
    for (language, path) in translated {
        found.entry(language).or_insert_with(|| {
            debug!("Reusing earlier translation {}", path.display());
            path
        });
    }

    Ok(found)
}

fn is_translation_suffix(source: &str, target: &str) -> bool {
    !target.contains('.')
        && language_utils::validate_language_tag(source).is_ok()
        && language_utils::validate_language_tag(target).is_ok()
}

#[async_trait]
impl Acquirer for YtDlpDownloader {
    async fn fetch(&self, url: &str) -> Result<DownloadResult, MediaError> {
        validate_url(url)?;
        FileManager::ensure_dir(&self.download_dir).map_err(|e| MediaError::Launch {
            tool: self.yt_dlp_path.clone(),
            message: format!("{:#}", e),
        })?;

        info!("Downloading {} into {}", url, self.download_dir.display());
        let output = run_tool(&self.yt_dlp_path, self.download_args(url), self.timeout).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let (title, printed_path) = parse_printed_paths(&stdout)
            .ok_or_else(|| MediaError::NoVideo(url.to_string()))?;

        let video_file = if printed_path.is_file() {
            printed_path
        } else {
            warn!(
                "Reported file {} not found, searching {} by title",
                printed_path.display(),
                self.download_dir.display()
            );
            find_video_by_title(&self.download_dir, &title)
                .ok_or_else(|| MediaError::NoVideo(title.clone()))?
        };

        let stem = video_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| title.clone());
        let subtitles = find_subtitle_files(&self.download_dir, &stem).unwrap_or_else(|e| {
            warn!("Could not scan for subtitle files: {}", e);
            BTreeMap::new()
        });

        debug!("Found subtitle languages: {:?}", subtitles.keys().collect::<Vec<_>>());
        info!("Downloaded '{}' to {}", title, video_file.display());

        Ok(DownloadResult {
            title,
            video_file,
            subtitles,
        })
    }
}
