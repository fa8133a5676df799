use std::fmt::Display;

/// A resolved playlist of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub title: String,
}

impl Display for PlaylistRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.title, self.id)
    }
}

/// An entry of a playlist, pointing to a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    /// Identifier of the playlist entry itself
    pub id: String,
    pub video_id: String,
    pub title: String,
}

/// One page of a playlist listing.
///
/// An absent or empty `next_page_token` means the listing is exhausted.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

impl Page {
    /// Return the continuation token, if the listing continues
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}
