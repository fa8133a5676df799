use std::fmt::Display;

use super::Extension;

/// One retrievable encoding of a media item.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Identifier of the media item this stream belongs to
    pub video_id: String,
    /// Identifier of the encoding, as understood by the stream resolver
    pub format_id: String,
    /// None when the resolver reported a container we do not handle
    pub container: Option<Extension>,
    /// Audio bitrate in kbit/s
    pub audio_bitrate: Option<f64>,
    pub height: Option<u32>,
    /// Size announced by the resolver, in bytes
    pub filesize: Option<u64>,
    /// The URL is either absent or unusable until the descriptor is decrypted
    pub requires_decryption: bool,
    pub url: Option<String>,
}

impl StreamDescriptor {
    /// Whether the stream carries a usable, strictly positive audio bitrate
    pub fn has_audio_bitrate(&self) -> bool {
        self.audio_bitrate
            .map_or(false, |abr| abr.is_finite() && abr > 0.0)
    }
}

impl Display for StreamDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let container = self.container.map_or("?", |c| c.as_str());
        write!(f, "format {} ({container}", self.format_id)?;
        if let Some(abr) = self.audio_bitrate {
            write!(f, ", {abr:.0}k")?;
        }
        if let Some(height) = self.height {
            write!(f, ", {height}p")?;
        }
        write!(f, ")")
    }
}
