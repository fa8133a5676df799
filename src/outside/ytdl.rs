use std::{
    fmt::Debug,
    process::{Command, Output},
};

use serde_json::Value;
use tracing::{debug, warn};

use super::command::{assert_available, run_command, Capture};
use crate::{
    result::{ResolutionError, Result},
    types::{Extension, StreamDescriptor},
};

pub const YT_DL: &str = "youtube-dl";
pub const YT_DLP: &str = "yt-dlp";

/// Interface for listing the downloadable streams of a video
pub trait StreamResolver: Debug {
    /// Return every stream candidate of the video, in discovery order
    fn resolve_streams(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<StreamDescriptor>, ResolutionError>;

    /// Replace the stream URL by one that can be downloaded directly.
    fn decrypt(&self, stream: &mut StreamDescriptor) -> std::result::Result<(), ResolutionError>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug)]
pub struct Ytdl {
    program: String,
}

impl Ytdl {
    /// Verify that the configured program is reachable.
    ///
    /// When using the default `yt-dlp`, fall back to `youtube-dl` if it is not installed.
    pub fn new(program: String) -> Result<Self> {
        match assert_available(&program, "--version") {
            Ok(()) => Ok(Self { program }),
            Err(err) if program == YT_DLP => {
                debug!("{YT_DLP} not found, trying {YT_DL}");
                assert_available(YT_DL, "--version").map_err(|_| err)?;
                Ok(Self {
                    program: YT_DL.to_owned(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`ResolutionError::Unavailable`].
    ///
    /// Other failures are returned with their exit code.
    fn run_check_availability<F>(
        &self,
        f: F,
        capture: Capture,
    ) -> std::result::Result<Output, ResolutionError>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(&self.program, f, capture | Capture::STDERR)?;
        if res.status.success() {
            return Ok(res);
        }

        let stderr = String::from_utf8_lossy(&res.stderr);
        let is_unavailable = stderr
            .lines()
            .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"));
        if is_unavailable {
            Err(ResolutionError::Unavailable)
        } else {
            warn!("{} failed: {}", self.program, stderr.trim());
            Err(ResolutionError::Failed {
                code: res.status.code(),
            })
        }
    }
}

impl StreamResolver for Ytdl {
    fn resolve_streams(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<StreamDescriptor>, ResolutionError> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .arg("--no-warnings")
                    .arg("--skip-download")
                    .arg("-j")
                    .arg("--")
                    .arg(video_id)
            },
            Capture::STDOUT,
        )?;

        let json: Value = serde_json::from_slice(&res.stdout)?;
        let streams = parse_formats(video_id, &json);
        debug!("{} stream candidates for {video_id}", streams.len());

        if streams.is_empty() {
            Err(ResolutionError::NoCandidates)
        } else {
            Ok(streams)
        }
    }

    fn decrypt(&self, stream: &mut StreamDescriptor) -> std::result::Result<(), ResolutionError> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .arg("--no-warnings")
                    .arg("-g")
                    .args(["-f", stream.format_id.as_str()])
                    .arg("--")
                    .arg(&stream.video_id)
            },
            Capture::STDOUT,
        )?;

        let output = String::from_utf8_lossy(&res.stdout);
        let url = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| ResolutionError::NoUrl {
                format_id: stream.format_id.clone(),
            })?;

        stream.url = Some(url.to_owned());
        stream.requires_decryption = false;
        Ok(())
    }
}

/// Extract the stream candidates from the JSON info of a video.
///
/// Streams that cannot be fetched with a single HTTP request
/// (HLS playlists, DASH fragments, ...) are left out.
fn parse_formats(video_id: &str, json: &Value) -> Vec<StreamDescriptor> {
    let Some(formats) = json.get("formats").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut streams = Vec::with_capacity(formats.len());
    for f in formats {
        let Some(format_id) = f.get("format_id").and_then(Value::as_str) else {
            continue;
        };

        let protocol = f.get("protocol").and_then(Value::as_str).unwrap_or("https");
        if !matches!(protocol, "http" | "https") {
            continue;
        }

        let url = f
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_owned);
        let has_audio = f
            .get("acodec")
            .and_then(Value::as_str)
            .map_or(true, |acodec| acodec != "none");

        streams.push(StreamDescriptor {
            video_id: video_id.to_owned(),
            format_id: format_id.to_owned(),
            container: f.get("ext").and_then(Value::as_str).and_then(Extension::from_ext),
            audio_bitrate: f
                .get("abr")
                .and_then(Value::as_f64)
                .filter(|_| has_audio),
            height: f.get("height").and_then(Value::as_u64).map(|h| h as u32),
            filesize: f
                .get("filesize")
                .or_else(|| f.get("filesize_approx"))
                .and_then(Value::as_u64),
            requires_decryption: url.is_none(),
            url,
        });
    }

    streams
}
