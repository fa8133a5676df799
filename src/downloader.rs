use std::{
    fmt::Debug,
    io::{ErrorKind, Read, Write},
    path::Path,
    time::Duration,
};

use reqwest::blocking::Client;
use tracing::debug;

use crate::{artifacts::partial_file, result::DownloadError, types::StreamDescriptor};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const BUFFER_SIZE: usize = 64 * 1024;

/// Minimum number of percentage points between two progress notifications
const PROGRESS_STEP: u8 = 10;

/// Build the HTTP client shared by the catalog and the downloader.
///
/// Only connecting is time-limited: transfers of large streams can take a while.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(None)
        .build()
}

/// Interface for transferring a selected stream to a local file
pub trait StreamFetcher: Debug {
    /// Download the stream into `target`.
    ///
    /// Must be a no-op if `target` already exists.
    /// `progress` receives the completion percentage, at most every 10 points,
    /// and exactly once 100 when the file is complete.
    fn fetch(
        &self,
        stream: &StreamDescriptor,
        target: &Path,
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), DownloadError>;
}

#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl StreamFetcher for HttpDownloader {
    fn fetch(
        &self,
        stream: &StreamDescriptor,
        target: &Path,
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), DownloadError> {
        if target.exists() {
            debug!("{} already exists, skip download", target.display());
            return Ok(());
        }

        let url = stream.url.as_deref().ok_or(DownloadError::MissingUrl)?;
        debug!("Downloading {stream} into {}", target.display());

        let mut res = self.client.get(url).send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
            });
        }

        let content_length = res.content_length();
        let suffix = target
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        // The target only appears once the transfer is known to be complete
        let mut partial = partial_file(target, &suffix)?;
        let mut tracker = ProgressTracker::new(content_length.or(stream.filesize), progress);
        let written = copy_with_progress(&mut res, partial.as_file_mut(), &mut tracker)?;

        if let Some(expected) = content_length {
            if written != expected {
                return Err(DownloadError::Truncated { expected, written });
            }
        }

        partial.as_file().sync_all()?;
        partial.persist(target).map_err(|err| err.error)?;
        tracker.finish();

        debug!("Downloaded {written} bytes");
        Ok(())
    }
}

/// Turns byte counts into coarse percentage notifications
struct ProgressTracker<'a> {
    total: Option<u64>,
    last: u8,
    notify: &'a mut dyn FnMut(u8),
}

impl<'a> ProgressTracker<'a> {
    fn new(total: Option<u64>, notify: &'a mut dyn FnMut(u8)) -> Self {
        Self {
            total: total.filter(|&t| t > 0),
            last: 0,
            notify,
        }
    }

    fn update(&mut self, done: u64) {
        let Some(total) = self.total else {
            return;
        };

        // 100 is reserved for the completion notification
        let percent = (done.saturating_mul(100) / total).min(99) as u8;
        let step = percent - percent % PROGRESS_STEP;
        if step >= self.last + PROGRESS_STEP {
            self.last = step;
            (self.notify)(step);
        }
    }

    fn finish(&mut self) {
        self.last = 100;
        (self.notify)(100);
    }
}

fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    tracker: &mut ProgressTracker<'_>,
) -> Result<u64, DownloadError> {
    let mut buf = vec![0; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(DownloadError::Transfer(err)),
        };

        writer.write_all(&buf[..n])?;
        written += n as u64;
        tracker.update(written);
    }

    writer.flush()?;
    Ok(written)
}
