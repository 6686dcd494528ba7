//! Test double wrapping `MemoryStorage` with injectable failures and delays.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{MemoryStorage, Storage};
use crate::entities::{
    Category, DashboardStats, FavorVideo, FavorVideoPayload, Group, GroupPayload, NewCategory,
    NewUser, NewVideo, NewVideoStats, UpdateCategory, UpdateVideo, UpdateVideoStats, User, Video,
    VideoStats, VideoWithStats,
};
use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct FaultyStorage {
    inner: MemoryStorage,
    inserts_before_failure: Option<usize>,
    failing_stats_insert: Option<usize>,
    category_lookup_delay: Option<Duration>,
    inserts: AtomicUsize,
    stats: AtomicUsize,
}

impl FaultyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `count` video inserts through, then fails every later one.
    pub fn failing_inserts_after(mut self, count: usize) -> Self {
        self.inserts_before_failure = Some(count);
        self
    }

    /// Fails only the stats insert with this zero-based index.
    pub fn failing_stats_insert(mut self, index: usize) -> Self {
        self.failing_stats_insert = Some(index);
        self
    }

    pub fn slow_category_lookup(mut self, delay: Duration) -> Self {
        self.category_lookup_delay = Some(delay);
        self
    }

    fn injected(what: &str) -> AppError {
        AppError::Database(anyhow::anyhow!("injected {} failure", what))
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.inner.get_user_by_username(username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        self.inner.create_user(user).await
    }

    async fn list_videos(&self) -> Result<Vec<VideoWithStats>, AppError> {
        self.inner.list_videos().await
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoWithStats>, AppError> {
        self.inner.get_video(id).await
    }

    async fn videos_by_category(&self, category: &str) -> Result<Vec<VideoWithStats>, AppError> {
        self.inner.videos_by_category(category).await
    }

    async fn top_videos(
        &self,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<VideoWithStats>, AppError> {
        self.inner.top_videos(category, limit).await
    }

    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        self.inner.create_video(video).await
    }

    async fn insert_video_if_absent(&self, video: NewVideo) -> Result<Option<Video>, AppError> {
        let done = self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.inserts_before_failure.is_some_and(|limit| done >= limit) {
            return Err(Self::injected("video insert"));
        }
        self.inner.insert_video_if_absent(video).await
    }

    async fn update_video(&self, id: &str, video: UpdateVideo) -> Result<Option<Video>, AppError> {
        self.inner.update_video(id, video).await
    }

    async fn deactivate_video(&self, id: &str) -> Result<bool, AppError> {
        self.inner.deactivate_video(id).await
    }

    async fn existing_youtube_ids(
        &self,
        youtube_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        self.inner.existing_youtube_ids(youtube_ids).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.inner.list_categories().await
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        if let Some(delay) = self.category_lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.get_category_by_name(name).await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, AppError> {
        self.inner.create_category(category).await
    }

    async fn update_category(
        &self,
        id: &str,
        category: UpdateCategory,
    ) -> Result<Option<Category>, AppError> {
        self.inner.update_category(id, category).await
    }

    async fn delete_category(&self, id: &str) -> Result<bool, AppError> {
        self.inner.delete_category(id).await
    }

    async fn get_video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, AppError> {
        self.inner.get_video_stats(video_id).await
    }

    async fn update_video_stats(
        &self,
        video_id: &str,
        stats: UpdateVideoStats,
    ) -> Result<Option<VideoStats>, AppError> {
        self.inner.update_video_stats(video_id, stats).await
    }

    async fn create_video_stats(&self, stats: NewVideoStats) -> Result<VideoStats, AppError> {
        let index = self.stats.fetch_add(1, Ordering::SeqCst);
        if self.failing_stats_insert == Some(index) {
            return Err(Self::injected("stats insert"));
        }
        self.inner.create_video_stats(stats).await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.inner.dashboard_stats().await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        self.inner.list_groups().await
    }

    async fn groups_by_name(&self, group_name: &str) -> Result<Vec<Group>, AppError> {
        self.inner.groups_by_name(group_name).await
    }

    async fn create_group(&self, group: GroupPayload) -> Result<Group, AppError> {
        self.inner.create_group(group).await
    }

    async fn update_group(&self, id: &str, group: GroupPayload) -> Result<Option<Group>, AppError> {
        self.inner.update_group(id, group).await
    }

    async fn delete_group(&self, id: &str) -> Result<bool, AppError> {
        self.inner.delete_group(id).await
    }

    async fn list_favor_videos(&self) -> Result<Vec<FavorVideo>, AppError> {
        self.inner.list_favor_videos().await
    }

    async fn get_favor_video(&self, id: &str) -> Result<Option<FavorVideo>, AppError> {
        self.inner.get_favor_video(id).await
    }

    async fn create_favor_video(&self, favor: FavorVideoPayload) -> Result<FavorVideo, AppError> {
        self.inner.create_favor_video(favor).await
    }

    async fn update_favor_video(
        &self,
        id: &str,
        favor: FavorVideoPayload,
    ) -> Result<Option<FavorVideo>, AppError> {
        self.inner.update_favor_video(id, favor).await
    }

    async fn delete_favor_video(&self, id: &str) -> Result<bool, AppError> {
        self.inner.delete_favor_video(id).await
    }
}
