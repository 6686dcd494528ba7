use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::common::utils::with_timeout;
use crate::entities::{Category, NewCategory, UpdateCategory};
use crate::errors::AppError;
use crate::validation::Validate;
use crate::InnerState;

fn category_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

#[tracing::instrument(name = "Get all categories", skip(inner))]
pub async fn all_categories(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = with_timeout(inner.request_timeout(), inner.storage.list_categories()).await?;
    Ok(Json(categories))
}

#[tracing::instrument(name = "Create category", skip(inner, payload))]
pub async fn create_category(
    State(inner): State<InnerState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let Json(category) = payload?;
    category.validate()?;

    let created =
        with_timeout(inner.request_timeout(), inner.storage.create_category(category)).await?;
    tracing::info!("Created category {} ({})", created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "Update category", skip(inner, payload))]
pub async fn update_category(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let Json(update) = payload?;
    update.validate()?;

    with_timeout(
        inner.request_timeout(),
        inner.storage.update_category(&id, update),
    )
    .await?
    .map(Json)
    .ok_or_else(|| category_not_found(&id))
}

#[tracing::instrument(name = "Delete category", skip(inner))]
pub async fn delete_category(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if with_timeout(inner.request_timeout(), inner.storage.delete_category(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(category_not_found(&id))
    }
}
