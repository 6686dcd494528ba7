use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::api::common::utils::with_timeout;
use crate::errors::AppError;
use crate::format::{format_time_ago, format_views, Locale};
use crate::storage::Storage;
use crate::youtube::{build_search_query, search_with_details, FetchedVideo, SearchRequest, VideoSource};

/// A live search hit; never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub youtube_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub view_count: i64,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub keywords: Vec<String>,
    pub view_count_text: String,
    pub published_text: String,
}

impl SearchResult {
    fn from_fetched(
        video: FetchedVideo,
        category: &str,
        keywords: &[String],
        locale: Locale,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            view_count_text: format_views(video.view_count, locale),
            published_text: format_time_ago(video.published_at, now, locale),
            youtube_id: video.youtube_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            view_count: video.view_count,
            published_at: video.published_at,
            category: category.to_string(),
            keywords: keywords.to_vec(),
        }
    }
}

pub struct SearchService {
    storage: Arc<dyn Storage>,
    source: Arc<dyn VideoSource>,
    max_results: u32,
    lookup_timeout: Duration,
}

impl SearchService {
    pub fn new(
        storage: Arc<dyn Storage>,
        source: Arc<dyn VideoSource>,
        max_results: u32,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            source,
            max_results,
            lookup_timeout,
        }
    }

    /// Live platform search with the category's keywords. Unknown categories
    /// and categories without keywords return nothing without calling out.
    #[tracing::instrument(name = "Search category", skip(self))]
    pub async fn search_category(
        &self,
        category_name: &str,
        limit: Option<u32>,
        locale: Locale,
    ) -> Result<Vec<SearchResult>, AppError> {
        let lookup = self.storage.get_category_by_name(category_name);
        let Some(category) = with_timeout(self.lookup_timeout, lookup).await? else {
            info!("Category {} not found, nothing to search", category_name);
            return Ok(Vec::new());
        };
        let Some(query) = build_search_query(&category.keywords) else {
            info!("Category {} has no keywords, nothing to search", category.name);
            return Ok(Vec::new());
        };

        let request = SearchRequest::new(query, limit.unwrap_or(self.max_results));
        let fetched = search_with_details(self.source.as_ref(), &request).await?;

        let name = category.name.to_lowercase();
        let now = Utc::now();
        Ok(fetched
            .into_iter()
            .map(|video| SearchResult::from_fetched(video, &name, &category.keywords, locale, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewCategory;
    use crate::storage::faulty::FaultyStorage;
    use crate::storage::MemoryStorage;
    use crate::youtube::{MockVideoSource, SearchHit, VideoDetails};
    use chrono::Duration;

    const LOOKUP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

    async fn storage_with_category(keywords: &[&str]) -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .create_category(NewCategory {
                name: "Sermon".to_string(),
                description: None,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn unknown_or_empty_categories_do_not_call_out() {
        let storage = storage_with_category(&[]).await;
        let mut source = MockVideoSource::new();
        source.expect_search().times(0);
        let service = SearchService::new(storage, Arc::new(source), 10, LOOKUP_TIMEOUT);

        assert!(service
            .search_category("podcasts", None, Locale::En)
            .await
            .unwrap()
            .is_empty());
        assert!(service
            .search_category("sermon", None, Locale::En)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn results_carry_display_strings() {
        let storage = storage_with_category(&["grace", "mercy"]).await;
        let mut source = MockVideoSource::new();
        source
            .expect_search()
            .withf(|req| req.query == "+grace +mercy" && req.max_results == 3)
            .times(1)
            .returning(|_| {
                Ok(vec![SearchHit {
                    youtube_id: "1uPgQ4T3B2k".into(),
                    title: "The Grace of God".into(),
                    description: "Teaching".into(),
                    thumbnail_url: "https://i.ytimg.com/vi/1uPgQ4T3B2k/hqdefault.jpg".into(),
                    published_at: Utc::now() - Duration::days(3),
                }])
            });
        source.expect_video_details().times(1).returning(|ids| {
            Ok(vec![VideoDetails {
                youtube_id: ids[0].clone(),
                duration: "35:20".into(),
                view_count: 2_300_000,
            }])
        });
        let service = SearchService::new(storage.clone(), Arc::new(source), 10, LOOKUP_TIMEOUT);

        let results = service
            .search_category("sermon", Some(3), Locale::En)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, "sermon");
        assert_eq!(results[0].view_count_text, "2.3M views");
        assert_eq!(results[0].published_text, "3 days ago");
        assert!(storage.list_videos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_category_lookup_times_out_before_calling_out() {
        let storage =
            FaultyStorage::new().slow_category_lookup(std::time::Duration::from_secs(30));
        let mut source = MockVideoSource::new();
        source.expect_search().times(0);
        let service = SearchService::new(
            Arc::new(storage),
            Arc::new(source),
            10,
            std::time::Duration::from_millis(20),
        );

        let result = service.search_category("sermon", None, Locale::En).await;
        assert!(matches!(result, Err(AppError::Timeout(_))));
    }
}
