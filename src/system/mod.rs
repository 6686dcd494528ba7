//! Operational routes.

pub mod health_check;

use axum::routing::get;
use axum::Router;

#[tracing::instrument(name = "create_system_router")]
pub fn create_system_router() -> Router {
    tracing::info!("Creating system router");

    Router::new().route("/health", get(health_check::health_check))
}
