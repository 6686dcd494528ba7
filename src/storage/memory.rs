use std::cmp::Reverse;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Storage;
use crate::entities::{
    Category, DashboardStats, FavorVideo, FavorVideoPayload, Group, GroupPayload, NewCategory,
    NewUser, NewVideo, NewVideoStats, UpdateCategory, UpdateVideo, UpdateVideoStats, User, Video,
    VideoStats, VideoWithStats,
};
use crate::errors::AppError;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    videos: Vec<Video>,
    video_stats: Vec<VideoStats>,
    categories: Vec<Category>,
    groups: Vec<Group>,
    favor_videos: Vec<FavorVideo>,
}

impl Tables {
    fn with_stats(&self, video: &Video) -> VideoWithStats {
        VideoWithStats {
            video: video.clone(),
            stats: self
                .video_stats
                .iter()
                .find(|s| s.video_id == video.id)
                .cloned(),
        }
    }

    /// Active videos, newest first; later inserts win ties.
    fn active_newest_first<'a>(&'a self, category: Option<&'a str>) -> Vec<VideoWithStats> {
        let mut videos: Vec<VideoWithStats> = self
            .videos
            .iter()
            .rev()
            .filter(|v| v.is_active)
            .filter(|v| category.map_or(true, |c| v.category == c))
            .map(|v| self.with_stats(v))
            .collect();
        videos.sort_by_key(|v| Reverse(v.video.created_at));
        videos
    }

    fn build_video(video: NewVideo) -> Video {
        Video {
            id: Uuid::new_v4().to_string(),
            title: video.title,
            description: video.description,
            youtube_id: video.youtube_id,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            view_count: Some(video.view_count.unwrap_or(0)),
            category: video.category,
            keywords: video.keywords,
            published_at: video.published_at.naive_utc(),
            created_at: Some(Utc::now().naive_utc()),
            is_active: true,
        }
    }
}

/// In-process backend with the same semantics as `PgStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(what: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} '{}' already exists", what, value))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(conflict("User", &user.username));
        }
        let created = User {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            password: user.password,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_videos(&self) -> Result<Vec<VideoWithStats>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.active_newest_first(None))
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoWithStats>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .videos
            .iter()
            .find(|v| v.id == id && v.is_active)
            .map(|v| tables.with_stats(v)))
    }

    async fn videos_by_category(&self, category: &str) -> Result<Vec<VideoWithStats>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.active_newest_first(Some(category)))
    }

    async fn top_videos(
        &self,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<VideoWithStats>, AppError> {
        let tables = self.tables.read().await;
        let mut videos = tables.active_newest_first(category);
        videos.sort_by_key(|v| Reverse(v.total_views()));
        videos.truncate(limit.max(0) as usize);
        Ok(videos)
    }

    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        let mut tables = self.tables.write().await;
        if tables.videos.iter().any(|v| v.youtube_id == video.youtube_id) {
            return Err(conflict("Video", &video.youtube_id));
        }
        let created = Tables::build_video(video);
        tables.videos.push(created.clone());
        Ok(created)
    }

    async fn insert_video_if_absent(&self, video: NewVideo) -> Result<Option<Video>, AppError> {
        let mut tables = self.tables.write().await;
        if tables.videos.iter().any(|v| v.youtube_id == video.youtube_id) {
            return Ok(None);
        }
        let created = Tables::build_video(video);
        tables.videos.push(created.clone());
        Ok(Some(created))
    }

    async fn update_video(&self, id: &str, update: UpdateVideo) -> Result<Option<Video>, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(youtube_id) = &update.youtube_id {
            if tables
                .videos
                .iter()
                .any(|v| v.id != id && &v.youtube_id == youtube_id)
            {
                return Err(conflict("Video", youtube_id));
            }
        }

        let Some(video) = tables.videos.iter_mut().find(|v| v.id == id && v.is_active) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            video.title = title;
        }
        if let Some(description) = update.description {
            video.description = Some(description);
        }
        if let Some(youtube_id) = update.youtube_id {
            video.youtube_id = youtube_id;
        }
        if let Some(thumbnail_url) = update.thumbnail_url {
            video.thumbnail_url = thumbnail_url;
        }
        if let Some(duration) = update.duration {
            video.duration = duration;
        }
        if let Some(view_count) = update.view_count {
            video.view_count = Some(view_count);
        }
        if let Some(category) = update.category {
            video.category = category;
        }
        if let Some(keywords) = update.keywords {
            video.keywords = keywords;
        }
        if let Some(published_at) = update.published_at {
            video.published_at = published_at.naive_utc();
        }
        Ok(Some(video.clone()))
    }

    async fn deactivate_video(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.videos.iter_mut().find(|v| v.id == id && v.is_active) {
            Some(video) => {
                video.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn existing_youtube_ids(
        &self,
        youtube_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .videos
            .iter()
            .filter(|v| youtube_ids.contains(&v.youtube_id))
            .map(|v| v.youtube_id.clone())
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.read().await;
        let mut categories = tables.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == name.to_lowercase())
            .cloned())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, AppError> {
        let mut tables = self.tables.write().await;
        let name = category.name.trim().to_string();
        if tables
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase())
        {
            return Err(conflict("Category", &name));
        }
        let created = Category {
            id: Uuid::new_v4().to_string(),
            name,
            description: category.description,
            keywords: category.keywords,
            created_at: Some(Utc::now().naive_utc()),
        };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(
        &self,
        id: &str,
        update: UpdateCategory,
    ) -> Result<Option<Category>, AppError> {
        let mut tables = self.tables.write().await;
        let name = update.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            if tables
                .categories
                .iter()
                .any(|c| c.id != id && c.name.to_lowercase() == name.to_lowercase())
            {
                return Err(conflict("Category", name));
            }
        }

        let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = Some(description);
        }
        if let Some(keywords) = update.keywords {
            category.keywords = keywords;
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        Ok(tables.categories.len() < before)
    }

    async fn get_video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .video_stats
            .iter()
            .find(|s| s.video_id == video_id)
            .cloned())
    }

    async fn update_video_stats(
        &self,
        video_id: &str,
        update: UpdateVideoStats,
    ) -> Result<Option<VideoStats>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(stats) = tables.video_stats.iter_mut().find(|s| s.video_id == video_id) else {
            return Ok(None);
        };
        if let Some(total_views) = update.total_views {
            stats.total_views = total_views;
        }
        if let Some(weekly_views) = update.weekly_views {
            stats.weekly_views = weekly_views;
        }
        if let Some(monthly_views) = update.monthly_views {
            stats.monthly_views = monthly_views;
        }
        stats.last_updated = Utc::now().naive_utc();
        Ok(Some(stats.clone()))
    }

    async fn create_video_stats(&self, stats: NewVideoStats) -> Result<VideoStats, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.videos.iter().any(|v| v.id == stats.video_id) {
            return Err(AppError::Database(anyhow::anyhow!(
                "video_stats.video_id references missing video {}",
                stats.video_id
            )));
        }
        if tables.video_stats.iter().any(|s| s.video_id == stats.video_id) {
            return Err(conflict("Stats for video", &stats.video_id));
        }
        let created = VideoStats {
            id: Uuid::new_v4().to_string(),
            video_id: stats.video_id,
            total_views: stats.total_views,
            weekly_views: stats.weekly_views,
            monthly_views: stats.monthly_views,
            last_updated: Utc::now().naive_utc(),
        };
        tables.video_stats.push(created.clone());
        Ok(created)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let tables = self.tables.read().await;
        let active: Vec<&Video> = tables.videos.iter().filter(|v| v.is_active).collect();
        let total_views = tables
            .video_stats
            .iter()
            .filter(|s| active.iter().any(|v| v.id == s.video_id))
            .map(|s| s.total_views as i64)
            .sum();
        Ok(DashboardStats {
            total_videos: active.len() as i64,
            total_views,
            categories_count: tables.categories.len() as i64,
        })
    }

    async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| {
            (&a.group_name, a.group_value, &a.group_type).cmp(&(
                &b.group_name,
                b.group_value,
                &b.group_type,
            ))
        });
        Ok(groups)
    }

    async fn groups_by_name(&self, group_name: &str) -> Result<Vec<Group>, AppError> {
        let mut groups: Vec<Group> = self
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| g.group_name == group_name)
            .collect();
        groups.sort_by(|a, b| (a.group_value, &a.group_type).cmp(&(b.group_value, &b.group_type)));
        Ok(groups)
    }

    async fn create_group(&self, group: GroupPayload) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        let created = Group {
            id: Uuid::new_v4().to_string(),
            group_name: group.group_name,
            group_type: group.group_type,
            group_value: group.group_value,
        };
        tables.groups.push(created.clone());
        Ok(created)
    }

    async fn update_group(
        &self,
        id: &str,
        group: GroupPayload,
    ) -> Result<Option<Group>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.groups.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        existing.group_name = group.group_name;
        existing.group_type = group.group_type;
        existing.group_value = group.group_value;
        Ok(Some(existing.clone()))
    }

    async fn delete_group(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        Ok(tables.groups.len() < before)
    }

    async fn list_favor_videos(&self) -> Result<Vec<FavorVideo>, AppError> {
        let tables = self.tables.read().await;
        let mut favorites: Vec<FavorVideo> = tables.favor_videos.iter().rev().cloned().collect();
        favorites.sort_by_key(|f| Reverse(f.created_at));
        Ok(favorites)
    }

    async fn get_favor_video(&self, id: &str) -> Result<Option<FavorVideo>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.favor_videos.iter().find(|f| f.id == id).cloned())
    }

    async fn create_favor_video(&self, favor: FavorVideoPayload) -> Result<FavorVideo, AppError> {
        let mut tables = self.tables.write().await;
        let created = FavorVideo {
            id: Uuid::new_v4().to_string(),
            title: favor.title,
            youtube_link: favor.youtube_link,
            description: favor.description,
            category: favor.category,
            video_type: favor.video_type,
            created_at: Some(Utc::now().naive_utc()),
        };
        tables.favor_videos.push(created.clone());
        Ok(created)
    }

    async fn update_favor_video(
        &self,
        id: &str,
        favor: FavorVideoPayload,
    ) -> Result<Option<FavorVideo>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.favor_videos.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        existing.title = favor.title;
        existing.youtube_link = favor.youtube_link;
        existing.description = favor.description;
        existing.category = favor.category;
        existing.video_type = favor.video_type;
        Ok(Some(existing.clone()))
    }

    async fn delete_favor_video(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.favor_videos.len();
        tables.favor_videos.retain(|f| f.id != id);
        Ok(tables.favor_videos.len() < before)
    }
}
