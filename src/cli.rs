use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::types::{Bitrate, Extension};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("TUNEHARVEST_", $v)
    };
}

/// Archive the audio of a video playlist into a local directory of MP3 files.
///
/// Running it again on the same directory only processes what is missing.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// The playlist ID or URL to archive.
    /// When absent, playlists are searched interactively
    #[arg(env = arg_env!("PLAYLIST"))]
    pub playlist: Option<String>,

    /// The path to the output directory.
    /// When absent, it is asked interactively
    #[arg(short, long, env = arg_env!("OUT"))]
    pub out: Option<PathBuf>,

    /// The path to the configuration file.
    /// Defaults to `tuneharvest.toml` in the working directory, if it exists
    #[arg(short, long, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// The key of the catalog API
    #[arg(long, env = arg_env!("API_KEY"), hide_env_values = true)]
    pub api_key: Option<String>,

    /// The base URL of the catalog API
    #[arg(long, env = arg_env!("API_BASE"))]
    pub api_base: Option<String>,

    /// The container of the downloaded streams
    #[arg(long, value_enum, env = arg_env!("CONTAINER"))]
    pub container: Option<Extension>,

    /// The bitrate of the MP3 files, in kbit/s. Example: 192K
    #[arg(long, env = arg_env!("BITRATE"))]
    pub bitrate: Option<Bitrate>,

    /// The ffmpeg program to use
    #[arg(long, env = arg_env!("FFMPEG"))]
    pub ffmpeg: Option<String>,

    /// The yt-dlp program to use. youtube-dl is tried if the default is not found
    #[arg(long, env = arg_env!("YTDLP"))]
    pub ytdlp: Option<String>,

    /// Log more. Can be repeated
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Log less. Can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// The maximum log level, INFO being the default
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match i16::from(self.verbose) - i16::from(self.quiet) {
            i16::MIN..=-2 => Level::ERROR,
            -1 => Level::WARN,
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
