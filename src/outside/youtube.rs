use std::fmt::Debug;

use reqwest::{blocking::Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::{
    result::CatalogError,
    types::{Page, PlaylistItem, PlaylistRef, VideoMetadata},
};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Interface for the remote catalog listing playlists and videos
pub trait Catalog: Debug {
    /// Get one page of the playlist items.
    ///
    /// `page_token` must be the token returned with the previous page, or None for the first page.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page, CatalogError>;

    /// Get the video metadata, or None if the video does not exist or is private
    fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>, CatalogError>;

    /// Search playlists matching the query, best matches first
    fn search_playlists(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PlaylistRef>, CatalogError>;

    /// Get a playlist by its ID, or None if it does not exist or is private
    fn playlist(&self, playlist_id: &str) -> Result<Option<PlaylistRef>, CatalogError>;
}

/// Client of the [YouTube Data API](https://developers.google.com/youtube/v3)
#[derive(Debug)]
pub struct YoutubeApi {
    client: Client,
    base: String,
    api_key: String,
}

impl YoutubeApi {
    pub fn new(client: Client, base: &str, api_key: String) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{endpoint}", self.base);
        debug!("GET {url} {query:?}");

        let res = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()?;

        let status = res.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(CatalogError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        Ok(res.json()?)
    }
}

impl Catalog for YoutubeApi {
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<Page, CatalogError> {
        let page_size = page_size.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let res: PlaylistItemListResponse = self.get("playlistItems", &query)?;
        Ok(res.into())
    }

    fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>, CatalogError> {
        let res: VideoListResponse = self.get("videos", &[("part", "snippet"), ("id", video_id)])?;
        Ok(res.items.into_iter().next().map(|video| VideoMetadata {
            title: video.snippet.title,
            channel_title: video.snippet.channel_title,
        }))
    }

    fn search_playlists(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PlaylistRef>, CatalogError> {
        let max_results = max_results.to_string();
        let res: SearchListResponse = self.get(
            "search",
            &[
                ("part", "snippet"),
                ("type", "playlist"),
                ("q", query),
                ("maxResults", max_results.as_str()),
            ],
        )?;
        Ok(res.into_playlists())
    }

    fn playlist(&self, playlist_id: &str) -> Result<Option<PlaylistRef>, CatalogError> {
        let res: PlaylistListResponse =
            self.get("playlists", &[("part", "snippet"), ("id", playlist_id)])?;
        Ok(res.items.into_iter().next().map(|playlist| PlaylistRef {
            id: playlist.id,
            title: playlist.snippet.title,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    id: String,
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

impl From<PlaylistItemListResponse> for Page {
    fn from(res: PlaylistItemListResponse) -> Self {
        let items = res
            .items
            .into_iter()
            .filter_map(|item| {
                // Entries can point to something else than a video (e.g. a channel)
                let video_id = item.snippet.resource_id.video_id?;
                Some(PlaylistItem {
                    id: item.id,
                    video_id,
                    title: item.snippet.title,
                })
            })
            .collect();

        Page {
            items,
            next_page_token: res.next_page_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    playlist_id: Option<String>,
}

impl SearchListResponse {
    fn into_playlists(self) -> Vec<PlaylistRef> {
        self.items
            .into_iter()
            .filter_map(|res| {
                Some(PlaylistRef {
                    id: res.id.playlist_id?,
                    title: res.snippet.title,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistListResponse {
    #[serde(default)]
    items: Vec<PlaylistResource>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
struct TitleSnippet {
    title: String,
}
