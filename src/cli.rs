use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dubforge")]
#[command(author, version, about = "Download, subtitle, translate and re-dub online videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pipeline actions for a video URL
    Run {
        /// Video URL
        #[arg(required = true)]
        url: String,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Actions to run, by key (md, dv, ds, dt, tm, th, da) or name
        #[arg(short, long, value_delimiter = ',', num_args = 1.., default_value = "md")]
        actions: Vec<String>,

        /// External audio file to mix into the video
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Cut a media file between two timecodes without re-encoding
    Trim {
        /// Input media file
        #[arg(required = true)]
        input: PathBuf,

        /// Output file (defaults to <input>_trimmed_<start>_<end>.<ext>)
        output: Option<PathBuf>,

        /// Start timecode (HH:MM:SS[.mmm])
        #[arg(long)]
        start: String,

        /// End timecode (HH:MM:SS[.mmm])
        #[arg(long)]
        end: String,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Per-run overrides of the `[settings]` table.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Language of the source material
    #[arg(long)]
    pub source_lang: Option<String>,

    /// Language to translate into
    #[arg(long)]
    pub target_lang: Option<String>,

    /// Subtitle language to download
    #[arg(long)]
    pub subtitle_lang: Option<String>,

    /// Subtitle format (vtt or srt)
    #[arg(long)]
    pub subtitle_format: Option<String>,

    /// Video container extension
    #[arg(long)]
    pub video_format: Option<String>,
}
