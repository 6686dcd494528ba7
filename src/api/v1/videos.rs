use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::common::utils::with_timeout;
use crate::api::common::{LimitParams, SearchParams};
use crate::entities::{NewVideo, UpdateVideo, Video, VideoWithStats};
use crate::errors::AppError;
use crate::services::{IngestionReport, SearchResult};
use crate::validation::Validate;
use crate::InnerState;

fn video_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Video {} not found", id))
}

#[tracing::instrument(name = "Get all videos", skip(inner))]
pub async fn all_videos(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<VideoWithStats>>, AppError> {
    let videos = with_timeout(inner.request_timeout(), inner.storage.list_videos()).await?;
    tracing::debug!("Found {} active videos", videos.len());
    Ok(Json(videos))
}

#[tracing::instrument(name = "Get videos by category", skip(inner))]
pub async fn videos_by_category(
    State(inner): State<InnerState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<VideoWithStats>>, AppError> {
    let category = category.to_lowercase();
    let videos = with_timeout(
        inner.request_timeout(),
        inner.storage.videos_by_category(&category),
    )
    .await?;
    Ok(Json(videos))
}

#[tracing::instrument(name = "Get top videos", skip(inner))]
pub async fn top_videos(
    State(inner): State<InnerState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<VideoWithStats>>, AppError> {
    let videos = with_timeout(
        inner.request_timeout(),
        inner.storage.top_videos(None, params.resolve()),
    )
    .await?;
    Ok(Json(videos))
}

#[tracing::instrument(name = "Get top videos by category", skip(inner))]
pub async fn top_videos_by_category(
    State(inner): State<InnerState>,
    Path(category): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<VideoWithStats>>, AppError> {
    let category = category.to_lowercase();
    let videos = with_timeout(
        inner.request_timeout(),
        inner.storage.top_videos(Some(&category), params.resolve()),
    )
    .await?;
    Ok(Json(videos))
}

#[tracing::instrument(name = "Search videos for category", skip(inner))]
pub async fn search_videos(
    State(inner): State<InnerState>,
    Path(category): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let results = inner
        .search()
        .search_category(&category, params.limit, params.locale())
        .await?;
    tracing::info!("Search for {} returned {} videos", category, results.len());
    Ok(Json(results))
}

#[tracing::instrument(name = "Get video", skip(inner))]
pub async fn get_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<VideoWithStats>, AppError> {
    with_timeout(inner.request_timeout(), inner.storage.get_video(&id))
        .await?
        .map(Json)
        .ok_or_else(|| video_not_found(&id))
}

#[tracing::instrument(name = "Create video", skip(inner, payload))]
pub async fn create_video(
    State(inner): State<InnerState>,
    payload: Result<Json<NewVideo>, JsonRejection>,
) -> Result<(StatusCode, Json<Video>), AppError> {
    let Json(mut video) = payload?;
    video.validate()?;
    video.category = video.category.trim().to_lowercase();

    let created = with_timeout(inner.request_timeout(), inner.storage.create_video(video)).await?;
    tracing::info!("Created video {} ({})", created.id, created.youtube_id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "Update video", skip(inner, payload))]
pub async fn update_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateVideo>, JsonRejection>,
) -> Result<Json<Video>, AppError> {
    let Json(mut update) = payload?;
    update.validate()?;
    update.category = update.category.map(|c| c.trim().to_lowercase());

    with_timeout(inner.request_timeout(), inner.storage.update_video(&id, update))
        .await?
        .map(Json)
        .ok_or_else(|| video_not_found(&id))
}

/// Soft delete; the row stays so ingestion never brings it back.
#[tracing::instrument(name = "Delete video", skip(inner))]
pub async fn delete_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if with_timeout(inner.request_timeout(), inner.storage.deactivate_video(&id)).await? {
        tracing::info!("Deactivated video {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(video_not_found(&id))
    }
}

#[tracing::instrument(name = "Populate videos from YouTube", skip(inner))]
pub async fn populate_videos(
    State(inner): State<InnerState>,
) -> Result<Json<IngestionReport>, AppError> {
    let report = inner.ingestion().populate().await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatsResponse {
    pub message: String,
    pub updated: usize,
}

#[tracing::instrument(name = "Refresh video stats", skip(inner))]
pub async fn refresh_stats(
    State(inner): State<InnerState>,
) -> Result<Json<RefreshStatsResponse>, AppError> {
    let updated = inner.ingestion().refresh_stats().await?;
    Ok(Json(RefreshStatsResponse {
        message: "Video stats refreshed".to_string(),
        updated,
    }))
}
