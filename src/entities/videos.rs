use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::validation::{FieldErrors, Validate};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub youtube_id: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub view_count: Option<i32>,
    pub category: String,
    pub keywords: Vec<String>,
    pub published_at: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub id: String,
    pub video_id: String,
    pub total_views: i32,
    pub weekly_views: i32,
    pub monthly_views: i32,
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithStats {
    #[serde(flatten)]
    pub video: Video,
    pub stats: Option<VideoStats>,
}

impl VideoWithStats {
    pub fn total_views(&self) -> i32 {
        self.stats.as_ref().map(|s| s.total_views).unwrap_or(0)
    }
}

/// Flat row of `videos LEFT JOIN video_stats`.
#[derive(Debug, FromRow)]
pub struct VideoWithStatsRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub youtube_id: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub view_count: Option<i32>,
    pub category: String,
    pub keywords: Vec<String>,
    pub published_at: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub stats_id: Option<String>,
    pub total_views: Option<i32>,
    pub weekly_views: Option<i32>,
    pub monthly_views: Option<i32>,
    pub last_updated: Option<NaiveDateTime>,
}

impl From<VideoWithStatsRow> for VideoWithStats {
    fn from(row: VideoWithStatsRow) -> Self {
        let stats = match (row.stats_id, row.last_updated) {
            (Some(stats_id), Some(last_updated)) => Some(VideoStats {
                id: stats_id,
                video_id: row.id.clone(),
                total_views: row.total_views.unwrap_or(0),
                weekly_views: row.weekly_views.unwrap_or(0),
                monthly_views: row.monthly_views.unwrap_or(0),
                last_updated,
            }),
            _ => None,
        };

        VideoWithStats {
            video: Video {
                id: row.id,
                title: row.title,
                description: row.description,
                youtube_id: row.youtube_id,
                thumbnail_url: row.thumbnail_url,
                duration: row.duration,
                view_count: row.view_count,
                category: row.category,
                keywords: row.keywords,
                published_at: row.published_at,
                created_at: row.created_at,
                is_active: row.is_active,
            },
            stats,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub youtube_id: String,
    pub thumbnail_url: String,
    pub duration: String,
    #[serde(default)]
    pub view_count: Option<i32>,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub published_at: DateTime<Utc>,
}

impl Validate for NewVideo {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.required("title", &self.title);
        errors.required("youtubeId", &self.youtube_id);
        errors.required("thumbnailUrl", &self.thumbnail_url);
        errors.required("duration", &self.duration);
        errors.required("category", &self.category);
        errors.non_negative("viewCount", self.view_count);
        errors.no_blank_entries("keywords", &self.keywords);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub youtube_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub view_count: Option<i32>,
    pub category: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Validate for UpdateVideo {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("title", &self.title),
            ("youtubeId", &self.youtube_id),
            ("thumbnailUrl", &self.thumbnail_url),
            ("duration", &self.duration),
            ("category", &self.category),
        ] {
            if let Some(value) = value {
                errors.required(field, value);
            }
        }
        errors.non_negative("viewCount", self.view_count);
        if let Some(keywords) = &self.keywords {
            errors.no_blank_entries("keywords", keywords);
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoStats {
    pub total_views: Option<i32>,
    pub weekly_views: Option<i32>,
    pub monthly_views: Option<i32>,
}

impl Validate for UpdateVideoStats {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.non_negative("totalViews", self.total_views);
        errors.non_negative("weeklyViews", self.weekly_views);
        errors.non_negative("monthlyViews", self.monthly_views);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoStats {
    pub video_id: String,
    pub total_views: i32,
    pub weekly_views: i32,
    pub monthly_views: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub categories_count: i64,
}
