// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use ytransub::app_config::{self, Config, EmbedType, TranslationProvider};
use ytransub::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenAI,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for EmbedType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEmbedType {
    Soft,
    Hard,
}

impl From<CliEmbedType> for EmbedType {
    fn from(cli_embed: CliEmbedType) -> Self {
        match cli_embed {
            CliEmbedType::Soft => EmbedType::Soft,
            CliEmbedType::Hard => EmbedType::Hard,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for ytransub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Video URL to download and process
    #[arg(value_name = "URL", required_unless_present = "no_download")]
    url: Option<String>,

    /// Output video path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g. 'zh-CN', 'ja', 'fr')
    #[arg(short, long)]
    language: Option<String>,

    /// Subtitle embedding: soft (selectable track) or hard (burned in)
    #[arg(short, long, value_enum)]
    embed_type: Option<CliEmbedType>,

    /// Render only the translated line instead of both languages
    #[arg(long)]
    no_bilingual: bool,

    /// Process existing files instead of downloading
    #[arg(long, requires_all = ["video_file", "subtitle_file"])]
    no_download: bool,

    /// Existing video file (with --no-download)
    #[arg(long, requires = "no_download")]
    video_file: Option<PathBuf>,

    /// Existing subtitle file (with --no-download)
    #[arg(long, requires = "no_download")]
    subtitle_file: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ytransub - download a video, translate its captions with an LLM and
/// embed them back as soft or burned bilingual subtitles.
#[derive(Parser, Debug)]
#[command(name = "ytransub")]
#[command(version)]
#[command(about = "Video caption translation and bilingual subtitle embedding")]
#[command(long_about = "ytransub downloads a video with its captions, translates the captions with an LLM and embeds them back into the video.

EXAMPLES:
    ytransub https://youtu.be/VIDEO                    # Download, translate to zh-CN, burn bilingual
    ytransub -e soft https://youtu.be/VIDEO            # Mux a selectable bilingual ASS track
    ytransub -l ja --no-bilingual https://youtu.be/VIDEO
    ytransub --no-download --video-file a.mp4 --subtitle-file a.en.srt
    ytransub completions bash > ytransub.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. OPENAI_API_KEY, OPENAI_BASE_URL,
    TRANSLATION_MODEL, TARGET_LANGUAGE, DOWNLOAD_DIR and FFMPEG_PATH override it.")]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_colour_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_colour_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ytransub", &mut std::io::stdout());
            Ok(())
        }
        None => {
            if let Err(e) = run(cli.run).await {
                error!("{:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Load config, apply environment and CLI overrides, then run one job
fn build_config(options: &RunArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;
    config.apply_env_overrides();

    if let Some(language) = &options.language {
        config.target_language = language.clone();
    }
    if let Some(embed_type) = &options.embed_type {
        config.media.embed_type = embed_type.clone().into();
    }
    if options.no_bilingual {
        config.bilingual.enabled = false;
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run(options: RunArgs) -> Result<()> {
    // Apply the CLI level right away so config loading is logged at that level
    if let Some(cli_level) = &options.log_level {
        log::set_max_level(level_filter(&cli_level.clone().into()));
    }

    let config = build_config(&options)?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;

    let final_video = if options.no_download {
        let video_file = options
            .video_file
            .as_ref()
            .ok_or_else(|| anyhow!("--video-file is required with --no-download"))?;
        let subtitle_file = options
            .subtitle_file
            .as_ref()
            .ok_or_else(|| anyhow!("--subtitle-file is required with --no-download"))?;

        controller
            .run_existing(video_file, subtitle_file, options.output.clone())
            .await?
    } else {
        let url = options
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("URL is required unless --no-download is given"))?;

        controller.run_url(url, options.output.clone()).await?
    };

    info!("Success: {}", final_video.display());
    Ok(())
}
