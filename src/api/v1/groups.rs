use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::common::utils::with_timeout;
use crate::entities::{Group, GroupPayload};
use crate::errors::AppError;
use crate::validation::Validate;
use crate::InnerState;

fn group_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Group {} not found", id))
}

#[tracing::instrument(name = "Get all groups", skip(inner))]
pub async fn all_groups(State(inner): State<InnerState>) -> Result<Json<Vec<Group>>, AppError> {
    let groups = with_timeout(inner.request_timeout(), inner.storage.list_groups()).await?;
    tracing::debug!("Found {} groups", groups.len());
    Ok(Json(groups))
}

/// `type` in the path is the list a group belongs to, i.e. its `groupName`.
#[tracing::instrument(name = "Get groups by type", skip(inner))]
pub async fn groups_by_type(
    State(inner): State<InnerState>,
    Path(group_name): Path<String>,
) -> Result<Json<Vec<Group>>, AppError> {
    let groups = with_timeout(
        inner.request_timeout(),
        inner.storage.groups_by_name(&group_name),
    )
    .await?;
    Ok(Json(groups))
}

#[tracing::instrument(name = "Create group", skip(inner, payload))]
pub async fn create_group(
    State(inner): State<InnerState>,
    payload: Result<Json<GroupPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let Json(group) = payload?;
    group.validate()?;

    let created = with_timeout(inner.request_timeout(), inner.storage.create_group(group)).await?;
    tracing::info!("Created group {} / {}", created.group_name, created.group_type);
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "Update group", skip(inner, payload))]
pub async fn update_group(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    payload: Result<Json<GroupPayload>, JsonRejection>,
) -> Result<Json<Group>, AppError> {
    let Json(group) = payload?;
    group.validate()?;

    with_timeout(inner.request_timeout(), inner.storage.update_group(&id, group))
        .await?
        .map(Json)
        .ok_or_else(|| group_not_found(&id))
}

#[tracing::instrument(name = "Delete group", skip(inner))]
pub async fn delete_group(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if with_timeout(inner.request_timeout(), inner.storage.delete_group(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(group_not_found(&id))
    }
}
