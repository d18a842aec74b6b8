//! REST client for the song catalog backend.
//!
//! Three endpoints are consumed:
//! - `GET /view_songs_from_db` lists every song
//! - `GET /songs/search?title=<term>` filters by title
//! - `POST /songs/{id}/rate` stores a 1-5 star rating
//!
//! List responses go through [`normalize_response`], so the backend may answer
//! with a bare list or with `{"results": [...]}`.

use super::{
    normalize::normalize_response,
    record::{Song, SongId, Stars},
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const LIST_PATH: &str = "/view_songs_from_db";
pub const SEARCH_PATH: &str = "/songs/search";
const USER_AGENT: &str = concat!("songdash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error {0}: {1}")]
    Status(u16, String),

    /// Response body could not be read
    #[error("Decode error: {0}")]
    Decode(String),
}

/// The backend operations the dashboard depends on.
#[async_trait]
pub trait SongsApi: Send + Sync + 'static {
    async fn fetch_all(&self) -> Result<Vec<Song>, ApiError>;

    async fn search_by_title(&self, title: &str) -> Result<Vec<Song>, ApiError>;

    async fn rate(&self, song_id: &SongId, stars: Stars) -> Result<(), ApiError>;
}

#[derive(Debug, Serialize)]
struct RateRequest {
    rating: Stars,
}

pub struct HttpSongsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSongsClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url, LIST_PATH)
    }

    pub fn search_url(&self, title: &str) -> String {
        format!(
            "{}{}?title={}",
            self.base_url,
            SEARCH_PATH,
            urlencoding::encode(title)
        )
    }

    pub fn rate_url(&self, song_id: &SongId) -> String {
        format!(
            "{}/songs/{}/rate",
            self.base_url,
            urlencoding::encode(&song_id.to_string())
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), error_text));
        }
        Ok(response)
    }

    async fn get_songs(&self, url: &str) -> Result<Vec<Song>, ApiError> {
        log::debug!("GET {}", url);
        let response = Self::check(self.http_client.get(url).send().await?).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        // a body that is not JSON normalizes to an empty list
        let payload = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("response from {} is not JSON: {}", url, e);
                Value::String(body)
            }
        };
        let songs = normalize_response(payload);
        log::info!("received {} songs", songs.len());
        Ok(songs)
    }
}

#[async_trait]
impl SongsApi for HttpSongsClient {
    async fn fetch_all(&self) -> Result<Vec<Song>, ApiError> {
        self.get_songs(&self.list_url()).await
    }

    async fn search_by_title(&self, title: &str) -> Result<Vec<Song>, ApiError> {
        self.get_songs(&self.search_url(title)).await
    }

    async fn rate(&self, song_id: &SongId, stars: Stars) -> Result<(), ApiError> {
        let url = self.rate_url(song_id);
        log::debug!("POST {} rating={}", url, stars.value());
        let response = self
            .http_client
            .post(&url)
            .json(&RateRequest { rating: stars })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
