use std::{
    ffi::{OsStr, OsString},
    fmt::Debug,
    path::Path,
};

use tracing::debug;

use super::command::{assert_available, run_command, Capture, FFXXX_DEFAULT_ARGS};
use crate::{
    artifacts::partial_file,
    result::{Result, TranscodeError},
    types::Bitrate,
};

pub const FFMPEG: &str = "ffmpeg";

pub trait AudioTranscoder: Debug {
    /// Convert the raw media file into the audio output file.
    ///
    /// Must be a no-op if the output already exists.
    /// The output path only ever receives a complete file.
    fn convert(
        &self,
        raw: &Path,
        out: &Path,
        working_dir: &Path,
    ) -> std::result::Result<(), TranscodeError>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg {
    program: String,
    bitrate: Bitrate,
}

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new(program: String, bitrate: Bitrate) -> Result<Self> {
        assert_available(&program, "-version")?;

        Ok(Self { program, bitrate })
    }

    /// Arguments converting `input` into an MP3 stream written to `output`.
    ///
    /// Every path is its own argument so no quoting is ever needed.
    fn convert_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let bitrate = self.bitrate.to_string();
        let mut args: Vec<OsString> = FFXXX_DEFAULT_ARGS
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push("-y".into());
        args.extend([OsStr::new("-i"), input.as_os_str()].map(OsString::from));
        args.extend(
            [
                "-vn",
                "-map_metadata",
                "0",
                "-c:a",
                "libmp3lame",
                "-b:a",
                bitrate.as_str(),
                "-f",
                "mp3",
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl AudioTranscoder for Ffmpeg {
    fn convert(
        &self,
        raw: &Path,
        out: &Path,
        working_dir: &Path,
    ) -> std::result::Result<(), TranscodeError> {
        if out.exists() {
            debug!("{} already exists, skip conversion", out.display());
            return Ok(());
        }

        // Write next to the output so that the final rename stays on the same filesystem
        let partial = partial_file(out, ".mp3")?;

        let args = self.convert_args(raw, partial.path());
        let res = run_command(
            &self.program,
            |cmd| cmd.current_dir(working_dir).args(&args),
            Capture::empty(),
        )
        .map_err(TranscodeError::Spawn)?;

        if !res.status.success() {
            return Err(TranscodeError::Failed {
                code: res.status.code(),
            });
        }

        partial.persist(out).map_err(|err| err.error)?;
        Ok(())
    }
}
