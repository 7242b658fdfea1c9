use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities, output naming

/// Extensions recognised as video containers
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "mov", "avi", "flv", "m4v", "ts",
];

/// Suffix appended to video stems for each kind of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOutputKind {
    /// Soft track muxed in
    SoftSubtitles,
    /// Single-language burn
    Burned,
    /// Two-layer burn
    Bilingual,
    /// Source-language-only burn
    English,
}

impl VideoOutputKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::SoftSubtitles => "_with_subtitles",
            Self::Burned => "_burned_subtitles",
            Self::Bilingual => "_bilingual",
            Self::English => "_english",
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }


    // @generates: Translated subtitle path, `{stem}.{lang}.{ext}` next to the input
    pub fn translated_subtitle_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        Self::sibling_with_name(input_file, &format!("{}.{}.srt", file_stem(input_file), target_language))
    }

    // @generates: Soft bilingual document path
    pub fn bilingual_ass_path<P: AsRef<Path>>(primary_file: P, has_secondary: bool) -> PathBuf {
        let primary_file = primary_file.as_ref();
        let suffix = if has_secondary { "_bilingual" } else { "_chinese" };
        Self::sibling_with_name(primary_file, &format!("{}{}.ass", file_stem(primary_file), suffix))
    }

    // @generates: Overlap-free copy of a track used as burn input
    pub fn deoverlapped_path<P: AsRef<Path>>(subtitle_file: P) -> PathBuf {
        let subtitle_file = subtitle_file.as_ref();
        Self::sibling_with_name(subtitle_file, &format!("{}.deoverlap.srt", file_stem(subtitle_file)))
    }

    // @generates: Video output path for the given kind
    pub fn video_output_path<P: AsRef<Path>>(video_file: P, kind: VideoOutputKind) -> PathBuf {
        let video_file = video_file.as_ref();
        let ext = video_file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self::sibling_with_name(video_file, &format!("{}{}{}", file_stem(video_file), kind.suffix(), ext))
    }

    fn sibling_with_name(path: &Path, name: &str) -> PathBuf {
        match path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Find files with a specific extension directly inside a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// True when the extension is a known video container
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Replace characters that are not allowed in file names
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}
