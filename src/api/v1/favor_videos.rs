use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::common::utils::with_timeout;
use crate::entities::{FavorVideo, FavorVideoPayload};
use crate::errors::AppError;
use crate::validation::Validate;
use crate::InnerState;

fn favor_video_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Favorite video {} not found", id))
}

#[tracing::instrument(name = "Get all favorite videos", skip(inner))]
pub async fn all_favor_videos(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<FavorVideo>>, AppError> {
    let favorites = with_timeout(inner.request_timeout(), inner.storage.list_favor_videos()).await?;
    Ok(Json(favorites))
}

#[tracing::instrument(name = "Get favorite video", skip(inner))]
pub async fn get_favor_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<FavorVideo>, AppError> {
    with_timeout(inner.request_timeout(), inner.storage.get_favor_video(&id))
        .await?
        .map(Json)
        .ok_or_else(|| favor_video_not_found(&id))
}

#[tracing::instrument(name = "Create favorite video", skip(inner, payload))]
pub async fn create_favor_video(
    State(inner): State<InnerState>,
    payload: Result<Json<FavorVideoPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<FavorVideo>), AppError> {
    let Json(favor) = payload?;
    favor.validate()?;

    let created =
        with_timeout(inner.request_timeout(), inner.storage.create_favor_video(favor)).await?;
    tracing::info!("Created favorite video {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "Update favorite video", skip(inner, payload))]
pub async fn update_favor_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    payload: Result<Json<FavorVideoPayload>, JsonRejection>,
) -> Result<Json<FavorVideo>, AppError> {
    let Json(favor) = payload?;
    favor.validate()?;

    with_timeout(
        inner.request_timeout(),
        inner.storage.update_favor_video(&id, favor),
    )
    .await?
    .map(Json)
    .ok_or_else(|| favor_video_not_found(&id))
}

#[tracing::instrument(name = "Delete favorite video", skip(inner))]
pub async fn delete_favor_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if with_timeout(inner.request_timeout(), inner.storage.delete_favor_video(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(favor_video_not_found(&id))
    }
}
