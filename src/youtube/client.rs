//! YouTube Data API v3 client.
//!
//! Two calls per search: `search.list` for the matching ids and snippets,
//! then `videos.list` for duration and view counts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};
use url::Url;

use super::duration::humanize_duration;
use crate::config::Settings;
use crate::errors::AppError;

/// `videos.list` accepts at most this many ids per call.
pub const MAX_IDS_PER_DETAILS_CALL: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Option<VideoSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(&self) -> Option<&Thumbnail> {
        self.maxres
            .as_ref()
            .or(self.standard.as_ref())
            .or(self.high.as_ref())
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub content_details: Option<ContentDetails>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    pub duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results: max_results.clamp(1, 50),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    pub youtube_id: String,
    /// Already converted to `m:ss` / `h:mm:ss`.
    pub duration: String,
    pub view_count: i64,
}

/// A search hit enriched with its details.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedVideo {
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub published_at: DateTime<Utc>,
    pub duration: String,
    pub view_count: i64,
}

/// The external video platform, as seen by ingestion and search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, AppError>;

    async fn video_details(&self, youtube_ids: &[String]) -> Result<Vec<VideoDetails>, AppError>;
}

/// Search, then enrich every hit with its details.
pub async fn search_with_details(
    source: &dyn VideoSource,
    request: &SearchRequest,
) -> Result<Vec<FetchedVideo>, AppError> {
    let hits = source.search(request).await?;
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = hits.iter().map(|h| h.youtube_id.clone()).collect();
    let details = source.video_details(&ids).await?;
    Ok(merge_details(hits, details))
}

/// Pairs hits with details by video id, keeping the search order. Hits the
/// details call did not return get `0:00` and zero views.
pub fn merge_details(hits: Vec<SearchHit>, details: Vec<VideoDetails>) -> Vec<FetchedVideo> {
    let mut by_id: HashMap<String, VideoDetails> = details
        .into_iter()
        .map(|d| (d.youtube_id.clone(), d))
        .collect();

    hits.into_iter()
        .map(|hit| {
            let detail = by_id.remove(&hit.youtube_id);
            FetchedVideo {
                duration: detail
                    .as_ref()
                    .map(|d| d.duration.clone())
                    .unwrap_or_else(|| "0:00".to_string()),
                view_count: detail.map(|d| d.view_count).unwrap_or(0),
                youtube_id: hit.youtube_id,
                title: hit.title,
                description: hit.description,
                thumbnail_url: hit.thumbnail_url,
                published_at: hit.published_at,
            }
        })
        .collect()
}

impl From<SearchListResponse> for Vec<SearchHit> {
    fn from(response: SearchListResponse) -> Self {
        response
            .items
            .into_iter()
            .filter_map(|item| {
                let youtube_id = item.id.video_id?;
                let snippet = item.snippet?;
                let published_at = match DateTime::parse_from_rfc3339(&snippet.published_at) {
                    Ok(p) => p.with_timezone(&Utc),
                    Err(e) => {
                        warn!("Skipping {}: bad publishedAt {:?}: {}", youtube_id, snippet.published_at, e);
                        return None;
                    }
                };
                let thumbnail_url = snippet
                    .thumbnails
                    .best()
                    .map(|t| t.url.clone())
                    .unwrap_or_else(|| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", youtube_id));

                Some(SearchHit {
                    youtube_id,
                    title: snippet.title,
                    description: snippet.description,
                    thumbnail_url,
                    published_at,
                })
            })
            .collect()
    }
}

impl From<VideoListResponse> for Vec<VideoDetails> {
    fn from(response: VideoListResponse) -> Self {
        response
            .items
            .into_iter()
            .map(|item| VideoDetails {
                duration: item
                    .content_details
                    .as_ref()
                    .map(|cd| humanize_duration(&cd.duration))
                    .unwrap_or_else(|| "0:00".to_string()),
                view_count: item
                    .statistics
                    .as_ref()
                    .and_then(|s| s.view_count.as_ref())
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(0),
                youtube_id: item.id,
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct YoutubeClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(settings.youtube_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: settings.youtube_api_base_url.clone(),
            api_key: settings.youtube_api_key.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ExternalService(anyhow::anyhow!("YOUTUBE_API_KEY is not configured"))
        })
    }

    pub fn search_url(&self, request: &SearchRequest) -> Result<Url, AppError> {
        let max_results = request.max_results.to_string();
        Ok(Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("q", request.query.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key()?),
            ],
        )?)
    }

    pub fn details_url(&self, youtube_ids: &[String]) -> Result<Url, AppError> {
        let ids = youtube_ids.join(",");
        Ok(Url::parse_with_params(
            &format!("{}/videos", self.base_url),
            &[
                ("part", "contentDetails,statistics"),
                ("id", ids.as_str()),
                ("key", self.api_key()?),
            ],
        )?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("YouTube API error {}: {}", status, error_text);
            return Err(AppError::ExternalService(anyhow::anyhow!(
                "YouTube API returned {}: {}",
                status,
                error_text
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl VideoSource for YoutubeClient {
    #[tracing::instrument(name = "YouTube search", skip(self), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, AppError> {
        let url = self.search_url(request)?;
        let response: SearchListResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "YouTube video details", skip(self, youtube_ids), fields(count = youtube_ids.len()))]
    async fn video_details(&self, youtube_ids: &[String]) -> Result<Vec<VideoDetails>, AppError> {
        let mut details = Vec::with_capacity(youtube_ids.len());
        for chunk in youtube_ids.chunks(MAX_IDS_PER_DETAILS_CALL) {
            let url = self.details_url(chunk)?;
            let response: VideoListResponse = self.get_json(url).await?;
            details.extend(Vec::<VideoDetails>::from(response));
        }
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(api_key: Option<&str>) -> YoutubeClient {
        let settings = Settings {
            youtube_api_key: api_key.map(str::to_string),
            youtube_api_base_url: "https://yt.example.test/v3".to_string(),
            ..Settings::default()
        };
        YoutubeClient::new(&settings).unwrap()
    }

    #[test]
    fn search_url_carries_query_and_key() {
        let url = client(Some("k3y"))
            .search_url(&SearchRequest::new("+worship +hymn", 500))
            .unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/v3/search");
        assert_eq!(params["q"], "+worship +hymn");
        assert_eq!(params["maxResults"], "50");
        assert_eq!(params["type"], "video");
        assert_eq!(params["key"], "k3y");
    }

    #[test]
    fn missing_api_key_is_an_external_error() {
        let err = client(None)
            .details_url(&["abc".to_string()])
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[test]
    fn search_response_skips_non_videos_and_picks_best_thumbnail() {
        let response: SearchListResponse = serde_json::from_value(json!({
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "CDdvReNKKuk" },
                    "snippet": {
                        "publishedAt": "2023-12-15T10:00:00Z",
                        "title": "Amazing Grace",
                        "description": "Classic hymn",
                        "thumbnails": {
                            "default": { "url": "https://i.ytimg.com/vi/CDdvReNKKuk/default.jpg" },
                            "high": { "url": "https://i.ytimg.com/vi/CDdvReNKKuk/hqdefault.jpg" }
                        },
                        "channelTitle": "Hymns"
                    }
                },
                {
                    "id": { "kind": "youtube#channel", "channelId": "UC123" },
                    "snippet": {
                        "publishedAt": "2023-12-15T10:00:00Z",
                        "title": "A channel"
                    }
                }
            ]
        }))
        .unwrap();

        let hits: Vec<SearchHit> = response.into();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].youtube_id, "CDdvReNKKuk");
        assert_eq!(
            hits[0].thumbnail_url,
            "https://i.ytimg.com/vi/CDdvReNKKuk/hqdefault.jpg"
        );
    }

    #[test]
    fn details_response_converts_duration_and_views() {
        let response: VideoListResponse = serde_json::from_value(json!({
            "items": [
                {
                    "id": "a",
                    "contentDetails": { "duration": "PT1H5M9S" },
                    "statistics": { "viewCount": "2300000" }
                },
                { "id": "b" }
            ]
        }))
        .unwrap();

        let details: Vec<VideoDetails> = response.into();
        assert_eq!(details[0].duration, "1:05:09");
        assert_eq!(details[0].view_count, 2_300_000);
        assert_eq!(details[1].duration, "0:00");
        assert_eq!(details[1].view_count, 0);
    }

    #[test]
    fn merge_matches_by_id_and_keeps_search_order() {
        let published_at = Utc::now();
        let hit = |id: &str| SearchHit {
            youtube_id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            thumbnail_url: String::new(),
            published_at,
        };
        let details = vec![
            VideoDetails {
                youtube_id: "b".into(),
                duration: "4:32".into(),
                view_count: 1_500,
            },
            VideoDetails {
                youtube_id: "a".into(),
                duration: "0:45".into(),
                view_count: 7,
            },
        ];

        let merged = merge_details(vec![hit("a"), hit("b"), hit("c")], details);
        assert_eq!(merged[0].youtube_id, "a");
        assert_eq!(merged[0].duration, "0:45");
        assert_eq!(merged[1].view_count, 1_500);
        assert_eq!(merged[2].duration, "0:00");
        assert_eq!(merged[2].view_count, 0);
    }
}
