use std::collections::VecDeque;

use tracing::{debug, info};

use crate::{outside::Catalog, result::CatalogError, types::PlaylistItem};

/// Number of items requested per page, the maximum allowed by the catalog
pub const PAGE_SIZE: u32 = 50;

/// Lazily iterates over all the items of a playlist, fetching one page at a time.
///
/// A page is only requested once the items of the previous one have all been consumed.
/// After an error, the iteration ends.
#[derive(Debug)]
pub struct PlaylistWalker<'a> {
    catalog: &'a dyn Catalog,
    playlist_id: &'a str,
    next_token: Option<String>,
    buffer: VecDeque<PlaylistItem>,
    finished: bool,
    pages: usize,
}

impl<'a> PlaylistWalker<'a> {
    pub fn new(catalog: &'a dyn Catalog, playlist_id: &'a str) -> Self {
        Self {
            catalog,
            playlist_id,
            next_token: None,
            buffer: VecDeque::new(),
            finished: false,
            pages: 0,
        }
    }

    /// Number of pages fetched so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch_page(&mut self) -> Result<(), CatalogError> {
        let page = self.catalog.list_playlist_items(
            self.playlist_id,
            self.next_token.as_deref(),
            PAGE_SIZE,
        )?;
        self.pages += 1;
        info!("Playlist page {}: {} items", self.pages, page.items.len());

        self.next_token = page.next_token().map(str::to_owned);
        if self.next_token.is_none() {
            debug!("Last page of the playlist reached");
            self.finished = true;
        }
        self.buffer.extend(page.items);
        Ok(())
    }
}

impl Iterator for PlaylistWalker<'_> {
    type Item = Result<PlaylistItem, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop as a page may be empty while not being the last one
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.finished = true;
                return Some(Err(err));
            }
        }
    }
}
