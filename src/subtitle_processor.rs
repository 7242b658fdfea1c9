use anyhow::{anyhow, Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::SubtitleError;

// @module: Timed-text parsing and serialization (SRT and WebVTT)

// @const: Cue timing line, accepts both ',' and '.' before the fraction
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{1,2}:\d{2}[,.]\d{1,3})\s*-->\s*((?:\d+:)?\d{1,2}:\d{2}[,.]\d{1,3})(?:\s.*)?$")
        .unwrap()
});

// @const: Inline WebVTT markup such as <c>, <i> or <00:00:01.000>
static VTT_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Timed-text flavours understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip: index line, `HH:MM:SS,mmm --> HH:MM:SS,mmm`, text
    Srt,
    /// WebVTT: `WEBVTT` header, `HH:MM:SS.mmm --> HH:MM:SS.mmm`, text
    Vtt,
}

impl SubtitleFormat {
    /// Pick the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            _ => Err(SubtitleError::UnsupportedFormat(path.display().to_string())),
        }
    }

    // @returns: Extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

// @struct: Single timed text unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Single-line text
    pub text: String,
}

impl Cue {
    /// Creates a cue without checking the time range
    pub fn new(start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        Cue {
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    // @creates: Validated cue
    // @validates: end after start
    pub fn new_validated(start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Result<Self> {
        if end_time_ms <= start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} <= start time {}",
                end_time_ms,
                start_time_ms
            ));
        }

        Ok(Self::new(start_time_ms, end_time_ms, text))
    }

    /// Creates a cue from times in seconds, rounded to the nearest millisecond
    pub fn from_secs(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self::new(secs_to_ms(start), secs_to_ms(end), text)
    }

    pub fn start_secs(&self) -> f64 {
        self.start_time_ms as f64 / 1000.0
    }

    pub fn end_secs(&self) -> f64 {
        self.end_time_ms as f64 / 1000.0
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Same interval, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(self.start_time_ms, self.end_time_ms, text)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)
    }
}

/// Round seconds to whole milliseconds; negative input clamps to zero
pub fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

/// Parse `HH:MM:SS[,.]mmm` (or `MM:SS.mmm`) to milliseconds
///
/// The fraction is read as a decimal fraction of a second, so `.5` is 500 ms.
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let timestamp = timestamp.trim();
    let (clock, fraction) = timestamp
        .rsplit_once(|c: char| c == ',' || c == '.')
        .ok_or_else(|| anyhow!("Invalid timestamp format: {}", timestamp))?;

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (
            h.parse::<u64>().context("Failed to parse hours")?,
            m.parse::<u64>().context("Failed to parse minutes")?,
            s.parse::<u64>().context("Failed to parse seconds")?,
        ),
        [m, s] => (
            0,
            m.parse::<u64>().context("Failed to parse minutes")?,
            s.parse::<u64>().context("Failed to parse seconds")?,
        ),
        _ => return Err(anyhow!("Invalid timestamp format: {}", timestamp)),
    };

    if fraction.is_empty() || fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Invalid fraction in timestamp: {}", timestamp));
    }
    let millis = format!("{:0<3}", fraction)
        .parse::<u64>()
        .context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    hours
        .checked_mul(3_600_000)
        .and_then(|total| total.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Result of parsing one timed-text document
#[derive(Debug, Clone, Default)]
pub struct ParsedSubtitles {
    /// Valid cues, stably sorted by start time
    pub cues: Vec<Cue>,
    /// Blocks that looked like cues but could not be read
    pub skipped_blocks: usize,
}

/// Parse a timed-text document
///
/// Malformed blocks never fail the parse; they are dropped and counted in
/// `skipped_blocks`.
pub fn parse(content: &str, format: SubtitleFormat) -> ParsedSubtitles {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let blocks = split_blocks(&normalized);
    let mut parsed = ParsedSubtitles::default();

    for (block_index, block) in blocks.iter().enumerate() {
        let cue = match format {
            SubtitleFormat::Srt => Some(parse_srt_block(block)),
            SubtitleFormat::Vtt => {
                if is_vtt_metadata_block(block, block_index) {
                    None
                } else {
                    Some(parse_vtt_block(block))
                }
            }
        };

        match cue {
            Some(Some(cue)) => parsed.cues.push(cue),
            Some(None) => {
                parsed.skipped_blocks += 1;
                debug!("Skipping malformed subtitle block: {:?}", block.first());
            }
            None => {}
        }
    }

    // sort_by_key is stable, so cues sharing a start keep file order
    parsed.cues.sort_by_key(|cue| cue.start_time_ms);
    parsed
}

/// Serialize cues as SRT with 1-based sequential indices
pub fn to_srt_string(cues: &[Cue]) -> String {
    let mut output = String::new();
    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            cue.format_start_time(),
            cue.format_end_time(),
            cue.text
        ));
    }
    output
}

// Groups consecutive non-blank lines
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let caps = TIMING_REGEX.captures(line)?;
    let start = parse_timestamp(caps.get(1)?.as_str()).ok()?;
    let end = parse_timestamp(caps.get(2)?.as_str()).ok()?;
    Some((start, end))
}

fn join_text_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_cue(start: u64, end: u64, text: String) -> Option<Cue> {
    if text.is_empty() {
        return None;
    }
    Cue::new_validated(start, end, text).ok()
}

fn parse_srt_block(lines: &[&str]) -> Option<Cue> {
    if lines.len() < 3 {
        return None;
    }
    let (start, end) = parse_timing_line(lines[1])?;
    build_cue(start, end, join_text_lines(lines[2..].iter().copied()))
}

fn is_vtt_metadata_block(lines: &[&str], block_index: usize) -> bool {
    let first = lines.first().map(|l| l.trim()).unwrap_or_default();
    if block_index == 0 && first.starts_with("WEBVTT") {
        return true;
    }
    first == "NOTE"
        || first.starts_with("NOTE ")
        || first.starts_with("STYLE")
        || first.starts_with("REGION")
}

fn parse_vtt_block(lines: &[&str]) -> Option<Cue> {
    // An optional cue identifier may precede the timing line
    let timing_index = if parse_timing_line(lines[0]).is_some() {
        0
    } else if lines.len() > 1 && parse_timing_line(lines[1]).is_some() {
        1
    } else {
        return None;
    };

    let (start, end) = parse_timing_line(lines[timing_index])?;
    let stripped: Vec<String> = lines[timing_index + 1..]
        .iter()
        .map(|line| VTT_TAG_REGEX.replace_all(line, "").into_owned())
        .collect();
    build_cue(start, end, join_text_lines(stripped.iter().map(String::as_str)))
}

/// Ordered cue sequence with its origin
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// File the cues were read from or will be written to
    pub source_file: PathBuf,

    /// Language tag of the text
    pub language: String,

    /// Cues ordered by start time
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new(source_file: PathBuf, language: impl Into<String>) -> Self {
        SubtitleTrack {
            source_file,
            language: language.into(),
            cues: Vec::new(),
        }
    }

    /// Create a track from already ordered cues
    pub fn with_cues(source_file: PathBuf, language: impl Into<String>, cues: Vec<Cue>) -> Self {
        SubtitleTrack {
            source_file,
            language: language.into(),
            cues,
        }
    }

    /// Read and parse a timed-text file, choosing the format by extension
    pub fn read_from_file<P: AsRef<Path>>(path: P, language: &str) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SubtitleError::MissingFile(path.to_path_buf()));
        }
        let format = SubtitleFormat::from_path(path)?;

        let content = std::fs::read_to_string(path).map_err(|source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = parse(&content, format);
        debug!(
            "Parsed {} cues from {} ({} blocks skipped)",
            parsed.cues.len(),
            path.display(),
            parsed.skipped_blocks
        );

        Ok(Self::with_cues(path.to_path_buf(), language, parsed.cues))
    }

    /// Serialize as SRT
    pub fn to_srt_string(&self) -> String {
        to_srt_string(&self.cues)
    }

    /// Write subtitles to an SRT file in one piece
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let io_error = |source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, self.to_srt_string()).map_err(io_error)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Source texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.cues.iter().map(|cue| cue.text.as_str()).collect()
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
