use clap::ValueEnum;
use serde::Deserialize;

/// Container of the raw media file downloaded before transcoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    #[default]
    M4a,
    Webm,
    Mp4,
}

impl Extension {
    /// Return the extension without the leading dot.
    /// e.g. "m4a"
    pub fn as_str(self) -> &'static str {
        match self {
            Extension::M4a => "m4a",
            Extension::Webm => "webm",
            Extension::Mp4 => "mp4",
        }
    }

    /// Parse an extension as reported by the stream resolver.
    /// Return None for containers that cannot be selected.
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "m4a" => Some(Self::M4a),
            "webm" => Some(Self::Webm),
            "mp4" => Some(Self::Mp4),
            _ => None,
        }
    }
}
