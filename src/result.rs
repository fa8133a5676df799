use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Extension;

/// Errors stopping the whole run
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Could not run the `{program}` program")]
    #[diagnostic(
        code(tuneharvest::missing_tool),
        help("Install it or point the corresponding setting to its binary")
    )]
    MissingTool { program: String },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Could not load the configuration")]
    #[diagnostic(code(tuneharvest::config::load))]
    Load(#[from] config::ConfigError),

    #[error("No catalog API key configured")]
    #[diagnostic(
        code(tuneharvest::config::api_key),
        help("Set `api_key` in the configuration file or the TUNEHARVEST_API_KEY environment variable")
    )]
    MissingApiKey,

    #[error("Could not create the output directory {}", path.display())]
    #[diagnostic(code(tuneharvest::config::out))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read the answer from the terminal")]
    #[diagnostic(code(tuneharvest::config::input))]
    Input(#[from] io::Error),

    #[error("The input was closed before an answer was given")]
    #[diagnostic(code(tuneharvest::config::input))]
    InputClosed,

    #[error("An empty answer was given for: {question}")]
    #[diagnostic(code(tuneharvest::config::input))]
    EmptyAnswer { question: String },

    #[error("Invalid selection '{input}'")]
    #[diagnostic(
        code(tuneharvest::config::selection),
        help("Enter a number between 1 and {max}")
    )]
    InvalidSelection { input: String, max: usize },

    #[error("No playlist found after {attempts} searches")]
    #[diagnostic(code(tuneharvest::config::search))]
    NoSearchResults { attempts: usize },

    #[error("Playlist '{0}' does not exist or is private")]
    #[diagnostic(code(tuneharvest::config::playlist))]
    PlaylistNotFound(String),
}

/// Errors of the remote catalog listing playlists and videos
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("The catalog rejected the credentials (HTTP {status})")]
    #[diagnostic(
        code(tuneharvest::catalog::auth),
        help("Check that the API key is valid and allowed to use the YouTube Data API")
    )]
    Auth { status: u16 },

    #[error("Catalog request failed with HTTP {status}")]
    #[diagnostic(code(tuneharvest::catalog::status))]
    Status { status: u16 },

    #[error("Could not query the catalog")]
    #[diagnostic(code(tuneharvest::catalog::network))]
    Network(#[from] reqwest::Error),
}

/// Errors of the stream resolution of a single video
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not run the stream resolver")]
    Spawn(#[from] io::Error),

    #[error("stream resolver failed (exit code {code:?})")]
    Failed { code: Option<i32> },

    #[error("the video is unavailable")]
    Unavailable,

    #[error("no stream candidates were returned")]
    NoCandidates,

    #[error("could not parse the stream resolver output")]
    Parse(#[from] serde_json::Error),

    #[error("no usable URL for format {format_id}")]
    NoUrl { format_id: String },
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no {} stream with a known audio bitrate", container.as_str())]
    NoCandidate { container: Extension },

    #[error("could not decrypt the stream URL")]
    Decrypt(#[source] ResolutionError),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("the stream has no URL")]
    MissingUrl,

    #[error("request failed")]
    Network(#[from] reqwest::Error),

    #[error("server answered with HTTP {status}")]
    Status { status: u16 },

    #[error("transfer interrupted")]
    Transfer(#[source] io::Error),

    #[error("could not write the file")]
    Io(#[from] io::Error),

    #[error("transfer stopped after {written} of {expected} bytes")]
    Truncated { expected: u64, written: u64 },
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("could not run the transcoder")]
    Spawn(#[source] io::Error),

    #[error("transcoder failed (exit code {code:?})")]
    Failed { code: Option<i32> },

    #[error("could not write the transcoded file")]
    Io(#[from] io::Error),
}

/// Reason why a single playlist item failed
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("the video is not available in the catalog")]
    Unavailable,

    #[error("could not look the video up")]
    Catalog(#[source] CatalogError),

    #[error("could not resolve the streams")]
    Resolution(#[from] ResolutionError),

    #[error("could not select a stream")]
    Select(#[from] SelectError),

    #[error("could not download the stream")]
    Download(#[from] DownloadError),

    #[error("could not transcode the stream")]
    Transcode(#[from] TranscodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
