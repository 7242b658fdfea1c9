/*!
 * External media tools.
 *
 * - `downloader`: fetches a video and its caption files with yt-dlp
 * - `transcoder`: muxes or burns subtitles with ffmpeg and inspects inputs
 *
 * Both are reached through traits so the pipeline can run against fakes.
 */

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use crate::errors::MediaError;

pub mod downloader;
pub mod transcoder;

pub use self::downloader::{find_subtitle_files, Acquirer, DownloadResult, YtDlpDownloader};
pub use self::transcoder::{parse_media_info, FfmpegTranscoder, MediaInfo, Transcoder};

/// Run a tool to completion, killing it when `timeout` elapses
///
/// A non-zero exit becomes `MediaError::ToolFailed` with stderr kept verbatim.
pub(crate) async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, MediaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = capture_tool(program, args, timeout).await?;

    if !output.status.success() {
        return Err(MediaError::ToolFailed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(output)
}

/// Run a tool and return its output whatever the exit status
pub(crate) async fn capture_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, MediaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let result = tokio::select! {
        result = command.output() => result,
        _ = tokio::time::sleep(timeout) => {
            return Err(MediaError::Timeout {
                tool: program.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    result.map_err(|e| MediaError::Launch {
        tool: program.to_string(),
        message: e.to_string(),
    })
}

/// Strip banner and stream listing noise from ffmpeg stderr for log lines
pub fn summarize_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
