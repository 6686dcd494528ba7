use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::common::utils::with_timeout;
use crate::entities::{DashboardStats, NewVideoStats, UpdateVideoStats, VideoStats};
use crate::errors::AppError;
use crate::format::compact_number;
use crate::validation::Validate;
use crate::InnerState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub total_videos_text: String,
    pub total_views_text: String,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_videos_text: compact_number(stats.total_videos),
            total_views_text: compact_number(stats.total_views),
            stats,
        }
    }
}

#[tracing::instrument(name = "Get dashboard stats", skip(inner))]
pub async fn dashboard(
    State(inner): State<InnerState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let stats = with_timeout(inner.request_timeout(), inner.storage.dashboard_stats()).await?;
    Ok(Json(stats.into()))
}

/// Updates a video's counters. A video without a stats row gets one when
/// `totalViews` is supplied.
#[tracing::instrument(name = "Update video stats", skip(inner, payload))]
pub async fn update_video_stats(
    State(inner): State<InnerState>,
    Path(video_id): Path<String>,
    payload: Result<Json<UpdateVideoStats>, JsonRejection>,
) -> Result<(StatusCode, Json<VideoStats>), AppError> {
    let Json(update) = payload?;
    update.validate()?;
    let timeout = inner.request_timeout();

    let updated = with_timeout(
        timeout,
        inner.storage.update_video_stats(&video_id, update.clone()),
    )
    .await?;
    if let Some(stats) = updated {
        return Ok((StatusCode::OK, Json(stats)));
    }

    let Some(total_views) = update.total_views else {
        return Err(AppError::NotFound(format!(
            "Stats for video {} not found",
            video_id
        )));
    };
    if with_timeout(timeout, inner.storage.get_video(&video_id))
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)));
    }

    let created = with_timeout(
        timeout,
        inner.storage.create_video_stats(NewVideoStats {
            video_id: video_id.clone(),
            total_views,
            weekly_views: update.weekly_views.unwrap_or(0),
            monthly_views: update.monthly_views.unwrap_or(0),
        }),
    )
    .await?;
    tracing::info!("Created stats for video {}", video_id);
    Ok((StatusCode::CREATED, Json(created)))
}
