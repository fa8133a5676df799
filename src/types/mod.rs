mod bitrate;
mod extension;
mod metadata;
mod outcome;
mod playlist;
mod stream;

pub use bitrate::Bitrate;
pub use extension::Extension;
pub use metadata::VideoMetadata;
pub use outcome::{RunOutcome, RunSummary};
pub use playlist::{Page, PlaylistItem, PlaylistRef};
pub use stream::StreamDescriptor;
