//! Persistence seam shared by the HTTP handlers and the ingestion service.
//!
//! `PgStorage` is the production backend; `MemoryStorage` keeps the same
//! semantics in process for local runs and tests.

#[cfg(test)]
pub mod faulty;
pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::entities::{
    Category, DashboardStats, FavorVideo, FavorVideoPayload, Group, GroupPayload, NewCategory,
    NewUser, NewVideo, NewVideoStats, UpdateCategory, UpdateVideo, UpdateVideoStats, User, Video,
    VideoStats, VideoWithStats,
};
use crate::errors::AppError;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

#[async_trait]
pub trait Storage: Send + Sync {
    // users
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    // videos; every read excludes inactive rows
    async fn list_videos(&self) -> Result<Vec<VideoWithStats>, AppError>;
    async fn get_video(&self, id: &str) -> Result<Option<VideoWithStats>, AppError>;
    async fn videos_by_category(&self, category: &str) -> Result<Vec<VideoWithStats>, AppError>;
    async fn top_videos(
        &self,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<VideoWithStats>, AppError>;
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError>;
    /// Inserts unless the external id is already stored (active or not).
    async fn insert_video_if_absent(&self, video: NewVideo) -> Result<Option<Video>, AppError>;
    async fn update_video(&self, id: &str, video: UpdateVideo) -> Result<Option<Video>, AppError>;
    /// Soft delete. Returns false when no active video has this id.
    async fn deactivate_video(&self, id: &str) -> Result<bool, AppError>;
    /// Subset of `youtube_ids` already present, inactive rows included.
    async fn existing_youtube_ids(&self, youtube_ids: &[String])
        -> Result<HashSet<String>, AppError>;

    // categories
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    /// Case-insensitive match on the category name.
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError>;
    async fn create_category(&self, category: NewCategory) -> Result<Category, AppError>;
    async fn update_category(
        &self,
        id: &str,
        category: UpdateCategory,
    ) -> Result<Option<Category>, AppError>;
    async fn delete_category(&self, id: &str) -> Result<bool, AppError>;

    // stats
    async fn get_video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, AppError>;
    async fn update_video_stats(
        &self,
        video_id: &str,
        stats: UpdateVideoStats,
    ) -> Result<Option<VideoStats>, AppError>;
    async fn create_video_stats(&self, stats: NewVideoStats) -> Result<VideoStats, AppError>;
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError>;

    // groups
    async fn list_groups(&self) -> Result<Vec<Group>, AppError>;
    async fn groups_by_name(&self, group_name: &str) -> Result<Vec<Group>, AppError>;
    async fn create_group(&self, group: GroupPayload) -> Result<Group, AppError>;
    async fn update_group(&self, id: &str, group: GroupPayload)
        -> Result<Option<Group>, AppError>;
    async fn delete_group(&self, id: &str) -> Result<bool, AppError>;

    // favorites
    async fn list_favor_videos(&self) -> Result<Vec<FavorVideo>, AppError>;
    async fn get_favor_video(&self, id: &str) -> Result<Option<FavorVideo>, AppError>;
    async fn create_favor_video(&self, favor: FavorVideoPayload) -> Result<FavorVideo, AppError>;
    async fn update_favor_video(
        &self,
        id: &str,
        favor: FavorVideoPayload,
    ) -> Result<Option<FavorVideo>, AppError>;
    async fn delete_favor_video(&self, id: &str) -> Result<bool, AppError>;
}
