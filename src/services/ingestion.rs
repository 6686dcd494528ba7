//! Keyword-driven ingestion from the video platform into storage.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::FailurePolicy;
use crate::entities::{
    Category, NewVideo, NewVideoStats, UpdateVideo, UpdateVideoStats, VideoStats,
};
use crate::errors::AppError;
use crate::storage::Storage;
use crate::youtube::client::MAX_IDS_PER_DETAILS_CALL;
use crate::youtube::samples::matching_samples;
use crate::youtube::{
    build_search_query, has_usable_keywords, search_with_details, FetchedVideo, SearchRequest,
    VideoSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryOutcome {
    Ingested,
    SkippedNoKeywords,
    Failed,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: String,
    pub outcome: CategoryOutcome,
    pub inserted: usize,
    pub duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategoryReport {
    fn new(category: &str, outcome: CategoryOutcome) -> Self {
        Self {
            category: category.to_string(),
            outcome,
            inserted: 0,
            duplicates: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub categories: Vec<CategoryReport>,
    pub total_inserted: usize,
    pub total_duplicates: usize,
}

impl IngestionReport {
    fn push(&mut self, report: CategoryReport) {
        self.total_inserted += report.inserted;
        self.total_duplicates += report.duplicates;
        self.categories.push(report);
    }
}

/// A video about to be stored, with the counters its stats row starts at.
struct Candidate {
    video: NewVideo,
    total_views: i32,
    weekly_views: i32,
    monthly_views: i32,
}

#[derive(Default)]
struct StoreOutcome {
    inserted: usize,
    duplicates: usize,
}

pub struct IngestionService {
    storage: Arc<dyn Storage>,
    source: Arc<dyn VideoSource>,
    policy: FailurePolicy,
    max_results: u32,
}

impl IngestionService {
    pub fn new(
        storage: Arc<dyn Storage>,
        source: Arc<dyn VideoSource>,
        policy: FailurePolicy,
        max_results: u32,
    ) -> Self {
        Self {
            storage,
            source,
            policy,
            max_results,
        }
    }

    /// Searches the platform for every category and stores what is new.
    ///
    /// Only the initial category listing can fail the whole run; anything
    /// that goes wrong inside a category is reported for that category.
    #[tracing::instrument(name = "Populate videos", skip(self), fields(policy = ?self.policy))]
    pub async fn populate(&self) -> Result<IngestionReport, AppError> {
        let categories = self.storage.list_categories().await?;
        let mut report = IngestionReport::default();

        for category in &categories {
            if !has_usable_keywords(&category.keywords) {
                info!("Skipping category \"{}\": no keywords defined", category.name);
                report.push(CategoryReport::new(
                    &category.name,
                    CategoryOutcome::SkippedNoKeywords,
                ));
                continue;
            }

            info!("Populating category: {}", category.name);
            let category_report = self.populate_category(category).await;
            info!(
                "Category \"{}\": {:?}, {} inserted, {} already stored",
                category.name,
                category_report.outcome,
                category_report.inserted,
                category_report.duplicates
            );
            report.push(category_report);
        }

        info!(
            "Population complete: {} inserted, {} duplicates across {} categories",
            report.total_inserted,
            report.total_duplicates,
            report.categories.len()
        );
        Ok(report)
    }

    async fn populate_category(&self, category: &Category) -> CategoryReport {
        let name = category.name.to_lowercase();

        let (outcome, candidates) = match self.fetch_candidates(category, &name).await {
            Ok(candidates) => (CategoryOutcome::Ingested, candidates),
            Err(e) => {
                error!("Failed to fetch videos for category {}: {:?}", category.name, e);
                match self.policy {
                    FailurePolicy::Skip => {
                        let mut report = CategoryReport::new(&category.name, CategoryOutcome::Failed);
                        report.error = Some(e.to_string());
                        return report;
                    }
                    FailurePolicy::Sample => {
                        let samples = sample_candidates(&name, &category.keywords);
                        if samples.is_empty() {
                            warn!("No sample videos available for category \"{}\"", category.name);
                        }
                        (CategoryOutcome::Fallback, samples)
                    }
                }
            }
        };

        let mut stored = StoreOutcome::default();
        let result = self.store_candidates(candidates, &mut stored).await;
        let mut report = CategoryReport {
            inserted: stored.inserted,
            duplicates: stored.duplicates,
            ..CategoryReport::new(&category.name, outcome)
        };
        if let Err(e) = result {
            // rows written before the failure stay counted
            error!("Failed to store videos for category {}: {:?}", category.name, e);
            report.outcome = CategoryOutcome::Failed;
            report.error = Some(e.to_string());
        }
        report
    }

    async fn fetch_candidates(
        &self,
        category: &Category,
        name: &str,
    ) -> Result<Vec<Candidate>, AppError> {
        let Some(query) = build_search_query(&category.keywords) else {
            return Ok(Vec::new());
        };
        debug!("Search query for {}: {}", category.name, query);

        let request = SearchRequest::new(query, self.max_results);
        let fetched = search_with_details(self.source.as_ref(), &request).await?;

        Ok(fetched
            .into_iter()
            .map(|video| {
                let views = clamp_views(video.view_count);
                Candidate {
                    video: fetched_to_new_video(video, name, &category.keywords),
                    total_views: views,
                    weekly_views: 0,
                    monthly_views: 0,
                }
            })
            .collect())
    }

    /// Inserts candidates whose external id is not stored yet (inactive rows
    /// included) and gives each inserted video its stats row. Counts land in
    /// `outcome` as they happen, so a failure partway leaves them accurate.
    /// A video whose stats insert failed is still counted as inserted; the
    /// next `refresh_stats` creates its missing stats row.
    async fn store_candidates(
        &self,
        candidates: Vec<Candidate>,
        outcome: &mut StoreOutcome,
    ) -> Result<(), AppError> {
        if candidates.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = candidates
            .iter()
            .map(|c| c.video.youtube_id.clone())
            .collect();
        let existing = self.storage.existing_youtube_ids(&ids).await?;
        let mut seen: HashSet<String> = HashSet::new();

        for candidate in candidates {
            let youtube_id = candidate.video.youtube_id.clone();
            if existing.contains(&youtube_id) || !seen.insert(youtube_id.clone()) {
                debug!("Video {} already stored, skipping", youtube_id);
                outcome.duplicates += 1;
                continue;
            }

            match self.storage.insert_video_if_absent(candidate.video).await? {
                Some(video) => {
                    outcome.inserted += 1;
                    self.storage
                        .create_video_stats(NewVideoStats {
                            video_id: video.id,
                            total_views: candidate.total_views,
                            weekly_views: candidate.weekly_views,
                            monthly_views: candidate.monthly_views,
                        })
                        .await?;
                }
                // lost a race with a concurrent run
                None => outcome.duplicates += 1,
            }
        }

        Ok(())
    }

    /// Re-reads view counts for every active video and rolls the weekly and
    /// monthly counters forward. Returns the number of stats rows written.
    #[tracing::instrument(name = "Refresh video stats", skip(self))]
    pub async fn refresh_stats(&self) -> Result<usize, AppError> {
        let videos = self.storage.list_videos().await?;
        let mut written = 0;

        for batch in videos.chunks(MAX_IDS_PER_DETAILS_CALL) {
            let ids: Vec<String> = batch.iter().map(|v| v.video.youtube_id.clone()).collect();
            let details = match self.source.video_details(&ids).await {
                Ok(details) => details,
                Err(e) => {
                    error!("Failed to fetch details for {} videos: {:?}", ids.len(), e);
                    continue;
                }
            };
            let views_by_id: HashMap<String, i64> = details
                .into_iter()
                .map(|d| (d.youtube_id, d.view_count))
                .collect();

            for entry in batch {
                let Some(&views) = views_by_id.get(&entry.video.youtube_id) else {
                    debug!("No details returned for {}", entry.video.youtube_id);
                    continue;
                };
                let views = clamp_views(views);

                match &entry.stats {
                    Some(stats) => {
                        let update = roll_counters(stats, views, Utc::now().naive_utc());
                        self.storage
                            .update_video_stats(&entry.video.id, update)
                            .await?;
                    }
                    None => {
                        self.storage
                            .create_video_stats(NewVideoStats {
                                video_id: entry.video.id.clone(),
                                total_views: views,
                                weekly_views: 0,
                                monthly_views: 0,
                            })
                            .await?;
                    }
                }
                self.storage
                    .update_video(
                        &entry.video.id,
                        UpdateVideo {
                            view_count: Some(views),
                            ..UpdateVideo::default()
                        },
                    )
                    .await?;
                written += 1;
            }
        }

        info!("Refreshed stats for {} of {} videos", written, videos.len());
        Ok(written)
    }
}

/// New counters for a fresh platform total. Growth since the last snapshot
/// is added to the windowed counters, each of which restarts once its
/// window has passed.
pub fn roll_counters(stats: &VideoStats, new_total: i32, now: NaiveDateTime) -> UpdateVideoStats {
    let delta = new_total.saturating_sub(stats.total_views).max(0);
    let elapsed = now - stats.last_updated;

    let weekly = if elapsed > Duration::days(7) {
        delta
    } else {
        stats.weekly_views.saturating_add(delta)
    };
    let monthly = if elapsed > Duration::days(30) {
        delta
    } else {
        stats.monthly_views.saturating_add(delta)
    };

    UpdateVideoStats {
        total_views: Some(new_total),
        weekly_views: Some(weekly),
        monthly_views: Some(monthly),
    }
}

fn clamp_views(views: i64) -> i32 {
    i32::try_from(views.max(0)).unwrap_or(i32::MAX)
}

fn fetched_to_new_video(video: FetchedVideo, category: &str, keywords: &[String]) -> NewVideo {
    NewVideo {
        title: video.title,
        description: Some(video.description).filter(|d| !d.trim().is_empty()),
        youtube_id: video.youtube_id,
        thumbnail_url: video.thumbnail_url,
        duration: video.duration,
        view_count: Some(clamp_views(video.view_count)),
        category: category.to_string(),
        keywords: keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        published_at: video.published_at,
    }
}

fn sample_candidates(category: &str, keywords: &[String]) -> Vec<Candidate> {
    let mut rng = rand::thread_rng();
    matching_samples(category, keywords)
        .into_iter()
        .map(|sample| Candidate {
            video: sample.to_new_video(category),
            total_views: rng.gen_range(1_000..11_000),
            weekly_views: rng.gen_range(50..550),
            monthly_views: rng.gen_range(200..2_200),
        })
        .collect()
}
