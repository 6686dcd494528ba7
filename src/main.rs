mod api;
mod config;
mod entities;
mod errors;
mod format;
mod services;
mod storage;
mod system;
mod validation;
mod youtube;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::api::common::tracing::{
    make_custom_span, on_custom_failure, on_custom_request, on_custom_response,
};
use crate::config::{Settings, StorageBackend};
use crate::services::{IngestionService, SearchService};
use crate::storage::{MemoryStorage, PgStorage, Storage};
use crate::youtube::{VideoSource, YoutubeClient};

#[derive(Clone)]
pub struct InnerState {
    pub storage: Arc<dyn Storage>,
    pub youtube: Arc<dyn VideoSource>,
    pub settings: Arc<Settings>,
}

impl InnerState {
    pub fn new(
        storage: Arc<dyn Storage>,
        youtube: Arc<dyn VideoSource>,
        settings: Settings,
    ) -> Self {
        Self {
            storage,
            youtube,
            settings: Arc::new(settings),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.settings.request_timeout
    }

    pub fn ingestion(&self) -> IngestionService {
        IngestionService::new(
            self.storage.clone(),
            self.youtube.clone(),
            self.settings.ingest_failure_policy,
            self.settings.search_max_results,
        )
    }

    pub fn search(&self) -> SearchService {
        SearchService::new(
            self.storage.clone(),
            self.youtube.clone(),
            self.settings.search_max_results,
            self.request_timeout(),
        )
    }
}

async fn init_storage(settings: &Settings) -> anyhow::Result<Arc<dyn Storage>> {
    match settings.storage_backend {
        StorageBackend::Postgres => {
            Ok(Arc::new(PgStorage::connect(settings).await?))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_catalog=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    if settings.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY is not set; search and ingestion will fail");
    }

    let storage = init_storage(&settings).await?;
    let youtube: Arc<dyn VideoSource> = Arc::new(YoutubeClient::new(&settings)?);
    let bind_address = settings.bind_address.clone();
    let state = InnerState::new(storage, youtube, settings);

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = Router::new()
        .merge(api::create_api_router(state))
        .merge(system::create_system_router())
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_custom_span)
                .on_request(on_custom_request)
                .on_response(on_custom_response)
                .on_failure(on_custom_failure),
        )
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
