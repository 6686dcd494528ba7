//! Runtime settings read from the environment (after `.env` is loaded).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown storage backend '{}'", other)),
        }
    }
}

/// What ingestion does when the external API fails for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and move on to the next category.
    #[default]
    Skip,
    /// Log and ingest the built-in sample videos for the category instead.
    Sample,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "sample" | "fallback" => Ok(FailurePolicy::Sample),
            other => Err(anyhow!("unknown ingest failure policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: String,
    pub youtube_timeout: Duration,
    pub request_timeout: Duration,
    pub ingest_failure_policy: FailurePolicy,
    pub search_max_results: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            storage_backend: StorageBackend::Postgres,
            database_url: None,
            database_max_connections: 5,
            youtube_api_key: None,
            youtube_api_base_url: DEFAULT_YOUTUBE_API_BASE_URL.to_string(),
            youtube_timeout: Duration::from_millis(10_000),
            request_timeout: Duration::from_millis(10_000),
            ingest_failure_policy: FailurePolicy::Skip,
            search_max_results: 10,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match get("STORAGE_BACKEND") {
            Some(v) => v.parse().context("Invalid STORAGE_BACKEND")?,
            None => defaults.storage_backend,
        };

        let database_url = get("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORAGE_BACKEND=postgres"));
        }

        let ingest_failure_policy = match get("INGEST_FAILURE_POLICY") {
            Some(v) => v.parse().context("Invalid INGEST_FAILURE_POLICY")?,
            None => defaults.ingest_failure_policy,
        };

        let search_max_results = parse_or(&get, "SEARCH_MAX_RESULTS", defaults.search_max_results)?;
        if !(1..=50).contains(&search_max_results) {
            return Err(anyhow!("SEARCH_MAX_RESULTS must be between 1 and 50"));
        }

        Ok(Self {
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            storage_backend,
            database_url,
            database_max_connections: parse_or(
                &get,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            youtube_api_key: get("YOUTUBE_API_KEY"),
            youtube_api_base_url: get("YOUTUBE_API_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.youtube_api_base_url),
            youtube_timeout: Duration::from_millis(parse_or(&get, "YOUTUBE_TIMEOUT_MS", 10_000u64)?),
            request_timeout: Duration::from_millis(parse_or(&get, "REQUEST_TIMEOUT_MS", 10_000u64)?),
            ingest_failure_policy,
            search_max_results,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
