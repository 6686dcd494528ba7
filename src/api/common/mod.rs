//! Helpers shared by the API handlers.

pub mod tracing;
pub mod utils;

use serde::Deserialize;

use crate::format::Locale;

pub const DEFAULT_TOP_LIMIT: i64 = 10;
pub const MAX_TOP_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// Requested limit clamped to `1..=MAX_TOP_LIMIT`.
    pub fn resolve(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_TOP_LIMIT)
            .clamp(1, MAX_TOP_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub limit: Option<u32>,
    pub lang: Option<String>,
}

impl SearchParams {
    pub fn locale(&self) -> Locale {
        Locale::from_tag(self.lang.as_deref())
    }
}
