use std::{
    fmt,
    path::{Path, PathBuf},
};

use config::{Config, File, FileFormat};
use serde::Deserialize;
use tracing::debug;

use crate::{
    cli::Args,
    outside::{DEFAULT_API_BASE, FFMPEG, YT_DLP},
    result::ConfigError,
    types::{Bitrate, Extension},
};

/// Configuration file read when none is given explicitly
pub const DEFAULT_CONFIG_FILE: &str = "tuneharvest.toml";

/// Content of the configuration file, every setting being optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_key: Option<String>,
    api_base: Option<String>,
    out: Option<PathBuf>,
    playlist: Option<String>,
    container: Option<Extension>,
    bitrate: Option<Bitrate>,
    ffmpeg: Option<String>,
    ytdlp: Option<String>,
}

/// The settings of a run.
///
/// The command line and environment take precedence over the configuration file.
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub out: Option<PathBuf>,
    pub playlist: Option<String>,
    pub container: Extension,
    pub bitrate: Bitrate,
    pub ffmpeg: String,
    pub ytdlp: String,
}

impl Settings {
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file(path, true)?,
            None => read_file(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        Self::merge(args, file)
    }

    fn merge(args: Args, file: FileSettings) -> Result<Self, ConfigError> {
        let api_key = args
            .api_key
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            api_base: args
                .api_base
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            out: args.out.or(file.out),
            playlist: args.playlist.or(file.playlist),
            container: args.container.or(file.container).unwrap_or_default(),
            bitrate: args.bitrate.or(file.bitrate).unwrap_or_default(),
            ffmpeg: args
                .ffmpeg
                .or(file.ffmpeg)
                .unwrap_or_else(|| FFMPEG.to_owned()),
            ytdlp: args.ytdlp.or(file.ytdlp).unwrap_or_else(|| YT_DLP.to_owned()),
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("out", &self.out)
            .field("playlist", &self.playlist)
            .field("container", &self.container)
            .field("bitrate", &self.bitrate)
            .field("ffmpeg", &self.ffmpeg)
            .field("ytdlp", &self.ytdlp)
            .finish()
    }
}

fn read_file(path: &Path, required: bool) -> Result<FileSettings, ConfigError> {
    if !required && !path.exists() {
        return Ok(FileSettings::default());
    }

    debug!("Loading the configuration from {}", path.display());
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(required))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn file_settings_are_used() {
        let file = write_config(indoc! {r#"
            api_key = "secret"
            out = "/music"
            container = "webm"
            bitrate = "128K"
            ytdlp = "youtube-dl"
        "#});

        let args = Args {
            config: Some(file.path().to_owned()),
            ..Default::default()
        };
        let settings = Settings::load(args).unwrap();

        assert_eq!(settings.api_key, "secret");
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.out, Some(PathBuf::from("/music")));
        assert_eq!(settings.container, Extension::Webm);
        assert_eq!(settings.bitrate.to_string(), "128K");
        assert_eq!(settings.ffmpeg, FFMPEG);
        assert_eq!(settings.ytdlp, "youtube-dl");
    }

    #[test]
    fn command_line_wins_over_the_file() {
        let file = write_config(indoc! {r#"
            api_key = "from-file"
            container = "webm"
        "#});

        let args = Args {
            config: Some(file.path().to_owned()),
            api_key: Some("from-cli".to_owned()),
            container: Some(Extension::Mp4),
            ..Default::default()
        };
        let settings = Settings::load(args).unwrap();

        assert_eq!(settings.api_key, "from-cli");
        assert_eq!(settings.container, Extension::Mp4);
        assert_eq!(settings.bitrate, Bitrate::default());
    }

    #[test]
    fn api_key_is_not_printed() {
        let args = Args {
            api_key: Some("AIzaSy-very-secret".to_owned()),
            ..Default::default()
        };
        let settings = Settings::merge(args, FileSettings::default()).unwrap();

        let printed = format!("{settings:?}");
        assert!(!printed.contains("very-secret"), "{printed}");
        assert!(printed.contains("api_base"), "{printed}");
    }

    #[test]
    fn api_key_is_required() {
        let err = Settings::merge(Args::default(), FileSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let args = Args {
            api_key: Some("  ".to_owned()),
            ..Default::default()
        };
        let err = Settings::merge(args, FileSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn explicit_file_must_exist_and_be_valid() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/tuneharvest.toml")),
            ..Default::default()
        };
        assert!(matches!(
            Settings::load(args).unwrap_err(),
            ConfigError::Load(_)
        ));

        let file = write_config(indoc! {r#"
            api_key = "secret"
            bitrate = "fast"
        "#});
        let args = Args {
            config: Some(file.path().to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::load(args).unwrap_err(),
            ConfigError::Load(_)
        ));
    }
}
