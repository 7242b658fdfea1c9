/*!
 * Error types for the ytransub application.
 *
 * Each stage of the pipeline has its own error enum, defined with the
 * thiserror crate. Orchestration code wraps them with anyhow context.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map an HTTP error status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur while reading or writing timed-text files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The input file does not exist
    #[error("Subtitle file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The file extension is not a supported timed-text format
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Reading or writing failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The model reply could not be decoded as a translation payload
    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    /// The model reply decoded but had the wrong number of lines
    #[error("Translated line count mismatch (expected {expected}, actual {actual})")]
    CountMismatch { expected: usize, actual: usize },

    /// A batch kept failing until its retry budget ran out
    #[error("Batch {} failed after {attempts} attempts: {last_error}", .batch + 1)]
    RetriesExhausted {
        /// Zero-based batch index
        batch: usize,
        /// Number of provider calls made for the batch
        attempts: u32,
        /// The failure seen on the final attempt
        last_error: Box<TranslationError>,
    },

    /// A failure tied to a specific input file
    #[error("Translation of {} failed: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<TranslationError>,
    },

    /// The request payload could not be encoded
    #[error("Failed to encode translation request: {0}")]
    Encode(String),
}

impl TranslationError {
    /// Attach the file the failure belongs to
    pub fn for_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Error on the last attempt, looking through file and retry wrappers
    pub fn root(&self) -> &TranslationError {
        match self {
            Self::File { source, .. } => source.root(),
            Self::RetriesExhausted { last_error, .. } => last_error.root(),
            other => other,
        }
    }
}

/// Errors from the external acquisition and transcoding tools
#[derive(Error, Debug)]
pub enum MediaError {
    /// A required input file is missing
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The tool binary could not be started
    #[error("Failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    /// The tool exited unsuccessfully; stderr is kept verbatim
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// The tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    /// The URL cannot be handed to the downloader
    #[error("Invalid video URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The download finished but no video file could be located
    #[error("No downloaded video found for '{0}'")]
    NoVideo(String),
}
