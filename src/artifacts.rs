use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{sanitize::sanitize, types::Extension};

/// File name prefix of files still being written.
///
/// Such files are never considered as artifacts and can be removed whenever
/// no run is active.
pub const PARTIAL_PREFIX: &str = ".partial-";

/// Extension of the transcoded audio files
pub const AUDIO_EXT: &str = "mp3";

/// Longest file stem, in bytes, leaving room for the extension under the usual 255 bytes limit
const MAX_STEM_LEN: usize = 240;

/// Location of both files produced for a playlist item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub raw: PathBuf,
    pub transcoded: PathBuf,
}

/// Knows where the artifacts of an item live and whether they exist.
///
/// The filesystem is the only source of truth, nothing is cached.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactStore {
    raw_ext: Extension,
}

impl ArtifactStore {
    pub fn new(raw_ext: Extension) -> Self {
        Self { raw_ext }
    }

    /// Compute the artifact paths of a title in the output directory.
    ///
    /// Only depends on its arguments, so that a later run finds the same files.
    pub fn paths(&self, out_dir: &Path, title: &str) -> ArtifactPaths {
        let name = file_stem(title);
        ArtifactPaths {
            raw: out_dir.join(format!("{name}.{}", self.raw_ext.as_str())),
            transcoded: out_dir.join(format!("{name}.{AUDIO_EXT}")),
        }
    }

    pub fn raw_exists(&self, paths: &ArtifactPaths) -> bool {
        paths.raw.exists()
    }

    pub fn transcoded_exists(&self, paths: &ArtifactPaths) -> bool {
        paths.transcoded.exists()
    }

    /// Delete the raw artifact once it is no longer needed
    pub fn remove_raw(&self, paths: &ArtifactPaths) -> io::Result<()> {
        std::fs::remove_file(&paths.raw)
    }
}

/// Turn a title into the stem of its artifact file names.
///
/// Leading dots are removed so that an artifact is never hidden
/// nor mistaken for a partial file.
/// May return an empty string, in which case the caller must use another name.
pub fn file_stem(title: &str) -> String {
    let name = sanitize(title);
    let name = name.trim_start_matches('.');

    let mut end = name.len().min(MAX_STEM_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_owned()
}

/// Create a named partial file in the same directory as `target`.
///
/// The file destructor will be called at the handle drop.
/// **As such, one must not simply get the file path and drop the handle.**
/// Use [`NamedTempFile::persist`] to move it to its final place.
pub fn partial_file(target: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(PARTIAL_PREFIX).suffix(suffix);

    // Same mode as a plain file creation, the umask still applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}

/// Remove the partial files left in the directory by interrupted runs.
/// Return the number of removed files.
pub fn sweep_partials(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in dir.read_dir()? {
        let entry = entry?;
        let is_partial = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with(PARTIAL_PREFIX));
        if !is_partial || !entry.file_type()?.is_file() {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                debug!("Removed stale partial file {}", entry.path().display());
                removed += 1;
            }
            Err(err) => warn!(
                "Could not remove stale partial file {}: {err}",
                entry.path().display()
            ),
        }
    }
    Ok(removed)
}
