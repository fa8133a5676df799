mod command;
mod ffmpeg;
mod youtube;
mod ytdl;

pub use ffmpeg::{AudioTranscoder, Ffmpeg, FFMPEG};
pub use youtube::{Catalog, YoutubeApi, DEFAULT_API_BASE};
pub use ytdl::{StreamResolver, Ytdl, YT_DLP};
