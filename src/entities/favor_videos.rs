use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::validation::{FieldErrors, Validate};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavorVideo {
    pub id: String,
    pub title: String,
    #[serde(rename = "youTubeLink")]
    pub youtube_link: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub video_type: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FavorVideoPayload {
    pub title: String,
    #[serde(rename = "youTubeLink")]
    pub youtube_link: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

impl Validate for FavorVideoPayload {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.required("title", &self.title);
        errors.max_len("title", &self.title, 100);
        errors.required("youTubeLink", &self.youtube_link);
        errors.max_len("youTubeLink", &self.youtube_link, 100);
        if let Some(description) = &self.description {
            errors.max_len("description", description, 200);
        }
        errors.required("category", &self.category);
        errors.max_len("category", &self.category, 100);
        errors.required("type", &self.video_type);
        errors.max_len("type", &self.video_type, 100);
        errors.into_result()
    }
}
