//! In-memory implementations of the external collaborators, for tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use tracing::Level;

use crate::{
    downloader::StreamFetcher,
    outside::{AudioTranscoder, Catalog, StreamResolver},
    result::{CatalogError, DownloadError, ResolutionError, TranscodeError},
    types::{Extension, Page, PlaylistItem, PlaylistRef, StreamDescriptor, VideoMetadata},
};

pub fn item(video_id: &str, title: &str) -> PlaylistItem {
    PlaylistItem {
        id: format!("item-{video_id}"),
        video_id: video_id.to_owned(),
        title: title.to_owned(),
    }
}

pub fn m4a_stream(video_id: &str, format_id: &str, abr: f64) -> StreamDescriptor {
    StreamDescriptor {
        video_id: video_id.to_owned(),
        format_id: format_id.to_owned(),
        container: Some(Extension::M4a),
        audio_bitrate: Some(abr),
        height: None,
        filesize: None,
        requires_decryption: false,
        url: Some(format!("https://media.example/{video_id}/{format_id}")),
    }
}

/// Returns two m4a streams for every video, or an error
#[derive(Debug, Default)]
pub struct FakeResolver {
    pub resolved: Cell<usize>,
    pub error: Option<fn() -> ResolutionError>,
    pub empty: bool,
}

impl StreamResolver for FakeResolver {
    fn resolve_streams(&self, video_id: &str) -> Result<Vec<StreamDescriptor>, ResolutionError> {
        self.resolved.set(self.resolved.get() + 1);
        if let Some(error) = self.error {
            return Err(error());
        }
        if self.empty {
            return Ok(vec![]);
        }
        Ok(vec![
            m4a_stream(video_id, "low", 64.0),
            m4a_stream(video_id, "high", 128.0),
        ])
    }

    fn decrypt(&self, stream: &mut StreamDescriptor) -> Result<(), ResolutionError> {
        stream.requires_decryption = false;
        Ok(())
    }
}

/// Writes the stream URL as the file content
#[derive(Debug, Default)]
pub struct FakeFetcher {
    pub fetched: RefCell<Vec<String>>,
    pub fail: bool,
}

impl StreamFetcher for FakeFetcher {
    fn fetch(
        &self,
        stream: &StreamDescriptor,
        target: &Path,
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), DownloadError> {
        if target.exists() {
            return Ok(());
        }
        self.fetched.borrow_mut().push(stream.format_id.clone());
        if self.fail {
            return Err(DownloadError::Status { status: 404 });
        }

        let url = stream.url.as_deref().ok_or(DownloadError::MissingUrl)?;
        std::fs::write(target, url)?;
        progress(50);
        progress(100);
        Ok(())
    }
}

/// Writes a fixed output when the raw input exists, or fails with an exit code
#[derive(Debug, Default)]
pub struct FakeTranscoder {
    pub converted: Cell<usize>,
    pub exit_code: Option<i32>,
}

impl AudioTranscoder for FakeTranscoder {
    fn convert(&self, raw: &Path, out: &Path, _working_dir: &Path) -> Result<(), TranscodeError> {
        if out.exists() {
            return Ok(());
        }
        self.converted.set(self.converted.get() + 1);
        if let Some(code) = self.exit_code {
            return Err(TranscodeError::Failed { code: Some(code) });
        }

        if !raw.exists() {
            return Err(io::Error::from(io::ErrorKind::NotFound).into());
        }
        std::fs::write(out, b"mp3")?;
        Ok(())
    }
}

/// Catalog serving pages chained by their tokens
#[derive(Debug, Default)]
pub struct FakeCatalog {
    /// Pages by the token requesting them, the first page having no token
    pub pages: HashMap<Option<String>, Page>,
    pub page_requests: RefCell<Vec<Option<String>>>,
    pub search_results: Vec<PlaylistRef>,
    pub searches: RefCell<Vec<String>>,
    pub playlists: Vec<PlaylistRef>,
    /// Videos missing from the catalog
    pub unavailable: Vec<String>,
    /// Return every search result, whatever the requested maximum
    pub ignore_max_results: bool,
    pub reject_auth: bool,
}

impl FakeCatalog {
    /// Build `sizes.len()` pages holding `sizes[i]` items each
    pub fn with_pages(playlist: &str, sizes: &[usize]) -> Self {
        let mut pages = HashMap::new();
        let mut token = None;
        let mut n = 0;
        for (i, &size) in sizes.iter().enumerate() {
            let next_token = (i + 1 < sizes.len()).then(|| format!("page{}", i + 2));
            let items = (0..size)
                .map(|_| {
                    n += 1;
                    item(&format!("{playlist}-v{n}"), &format!("Track {n}"))
                })
                .collect();
            pages.insert(
                token,
                Page {
                    items,
                    next_page_token: next_token.clone(),
                },
            );
            token = next_token;
        }

        Self {
            pages,
            ..Default::default()
        }
    }

    fn check_auth(&self) -> Result<(), CatalogError> {
        if self.reject_auth {
            Err(CatalogError::Auth { status: 403 })
        } else {
            Ok(())
        }
    }
}

impl Catalog for FakeCatalog {
    fn list_playlist_items(
        &self,
        _playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page, CatalogError> {
        self.check_auth()?;
        assert_eq!(page_size, 50);
        let page_token = page_token.map(str::to_owned);
        self.page_requests.borrow_mut().push(page_token.clone());
        self.pages
            .get(&page_token)
            .cloned()
            .ok_or(CatalogError::Status { status: 400 })
    }

    fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>, CatalogError> {
        self.check_auth()?;
        if self.unavailable.iter().any(|v| v == video_id) {
            return Ok(None);
        }

        let title = self
            .pages
            .values()
            .flat_map(|page| &page.items)
            .find(|item| item.video_id == video_id)
            .map_or_else(|| video_id.to_owned(), |item| item.title.clone());
        Ok(Some(VideoMetadata {
            title,
            channel_title: "Channel".to_owned(),
        }))
    }

    fn search_playlists(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PlaylistRef>, CatalogError> {
        self.check_auth()?;
        self.searches.borrow_mut().push(query.to_owned());
        let max_results = if self.ignore_max_results {
            usize::MAX
        } else {
            max_results as usize
        };
        Ok(self
            .search_results
            .iter()
            .take(max_results)
            .cloned()
            .collect())
    }

    fn playlist(&self, playlist_id: &str) -> Result<Option<PlaylistRef>, CatalogError> {
        self.check_auth()?;
        Ok(self
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .cloned())
    }
}

/// Shared in-memory sink for log lines
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` and return its result along with what it logged up to `level`
pub fn capture_logs<T>(level: Level, f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let res = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (res, logs)
}
