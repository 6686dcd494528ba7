use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::Storage;
use crate::config::Settings;
use crate::entities::{
    Category, DashboardStats, FavorVideo, FavorVideoPayload, Group, GroupPayload, NewCategory,
    NewUser, NewVideo, NewVideoStats, UpdateCategory, UpdateVideo, UpdateVideoStats, User, Video,
    VideoStats, VideoWithStats, VideoWithStatsRow,
};
use crate::errors::AppError;

const VIDEO_WITH_STATS_SELECT: &str = r#"
    SELECT v.id, v.title, v.description, v.youtube_id, v.thumbnail_url, v.duration,
           v.view_count, v.category, v.keywords, v.published_at, v.created_at, v.is_active,
           s.id AS stats_id, s.total_views, s.weekly_views, s.monthly_views, s.last_updated
    FROM videos v
    LEFT JOIN video_stats s ON s.video_id = v.id
"#;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies the embedded migrations.
    #[tracing::instrument(name = "Connect to Postgres", skip(settings))]
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let database_url = settings
            .database_url
            .as_deref()
            .context("DATABASE_URL is not set")?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .acquire_timeout(settings.request_timeout)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database connection pool ready");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password) VALUES ($1, $2, $3)
               RETURNING id, username, password"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_videos(&self) -> Result<Vec<VideoWithStats>, AppError> {
        let query = format!(
            "{} WHERE v.is_active = TRUE ORDER BY v.created_at DESC",
            VIDEO_WITH_STATS_SELECT
        );
        let rows = sqlx::query_as::<_, VideoWithStatsRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(VideoWithStats::from).collect())
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoWithStats>, AppError> {
        let query = format!(
            "{} WHERE v.id = $1 AND v.is_active = TRUE",
            VIDEO_WITH_STATS_SELECT
        );
        let row = sqlx::query_as::<_, VideoWithStatsRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(VideoWithStats::from))
    }

    async fn videos_by_category(&self, category: &str) -> Result<Vec<VideoWithStats>, AppError> {
        let query = format!(
            "{} WHERE v.category = $1 AND v.is_active = TRUE ORDER BY v.created_at DESC",
            VIDEO_WITH_STATS_SELECT
        );
        let rows = sqlx::query_as::<_, VideoWithStatsRow>(&query)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(VideoWithStats::from).collect())
    }

    async fn top_videos(
        &self,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<VideoWithStats>, AppError> {
        let query = format!(
            r#"{} WHERE v.is_active = TRUE AND ($1::TEXT IS NULL OR v.category = $1)
               ORDER BY COALESCE(s.total_views, 0) DESC, v.created_at DESC
               LIMIT $2"#,
            VIDEO_WITH_STATS_SELECT
        );
        let rows = sqlx::query_as::<_, VideoWithStatsRow>(&query)
            .bind(category)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(VideoWithStats::from).collect())
    }

    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        let created = sqlx::query_as::<_, Video>(
            r#"INSERT INTO videos (id, title, description, youtube_id, thumbnail_url, duration,
                                   view_count, category, keywords, published_at, created_at, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.youtube_id)
        .bind(&video.thumbnail_url)
        .bind(&video.duration)
        .bind(video.view_count.unwrap_or(0))
        .bind(&video.category)
        .bind(&video.keywords)
        .bind(video.published_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn insert_video_if_absent(&self, video: NewVideo) -> Result<Option<Video>, AppError> {
        let created = sqlx::query_as::<_, Video>(
            r#"INSERT INTO videos (id, title, description, youtube_id, thumbnail_url, duration,
                                   view_count, category, keywords, published_at, created_at, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE)
               ON CONFLICT (youtube_id) DO NOTHING
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.youtube_id)
        .bind(&video.thumbnail_url)
        .bind(&video.duration)
        .bind(video.view_count.unwrap_or(0))
        .bind(&video.category)
        .bind(&video.keywords)
        .bind(video.published_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_video(&self, id: &str, video: UpdateVideo) -> Result<Option<Video>, AppError> {
        let updated = sqlx::query_as::<_, Video>(
            r#"UPDATE videos SET
                   title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   youtube_id = COALESCE($4, youtube_id),
                   thumbnail_url = COALESCE($5, thumbnail_url),
                   duration = COALESCE($6, duration),
                   view_count = COALESCE($7, view_count),
                   category = COALESCE($8, category),
                   keywords = COALESCE($9, keywords),
                   published_at = COALESCE($10, published_at)
               WHERE id = $1 AND is_active = TRUE
               RETURNING *"#,
        )
        .bind(id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.youtube_id)
        .bind(&video.thumbnail_url)
        .bind(&video.duration)
        .bind(video.view_count)
        .bind(&video.category)
        .bind(&video.keywords)
        .bind(video.published_at.map(|p| p.naive_utc()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn deactivate_video(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE videos SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn existing_youtube_ids(
        &self,
        youtube_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if youtube_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let existing = sqlx::query_scalar::<_, String>(
            "SELECT youtube_id FROM videos WHERE youtube_id = ANY($1)",
        )
        .bind(youtube_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(existing.into_iter().collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, AppError> {
        let created = sqlx::query_as::<_, Category>(
            r#"INSERT INTO categories (id, name, description, keywords, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(category.name.trim())
        .bind(&category.description)
        .bind(&category.keywords)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_category(
        &self,
        id: &str,
        category: UpdateCategory,
    ) -> Result<Option<Category>, AppError> {
        let updated = sqlx::query_as::<_, Category>(
            r#"UPDATE categories SET
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   keywords = COALESCE($4, keywords)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(category.name.as_deref().map(str::trim))
        .bind(&category.description)
        .bind(&category.keywords)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_category(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, AppError> {
        let stats = sqlx::query_as::<_, VideoStats>("SELECT * FROM video_stats WHERE video_id = $1")
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stats)
    }

    async fn update_video_stats(
        &self,
        video_id: &str,
        stats: UpdateVideoStats,
    ) -> Result<Option<VideoStats>, AppError> {
        let updated = sqlx::query_as::<_, VideoStats>(
            r#"UPDATE video_stats SET
                   total_views = COALESCE($2, total_views),
                   weekly_views = COALESCE($3, weekly_views),
                   monthly_views = COALESCE($4, monthly_views),
                   last_updated = $5
               WHERE video_id = $1
               RETURNING *"#,
        )
        .bind(video_id)
        .bind(stats.total_views)
        .bind(stats.weekly_views)
        .bind(stats.monthly_views)
        .bind(Utc::now().naive_utc())
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn create_video_stats(&self, stats: NewVideoStats) -> Result<VideoStats, AppError> {
        let created = sqlx::query_as::<_, VideoStats>(
            r#"INSERT INTO video_stats (id, video_id, total_views, weekly_views, monthly_views, last_updated)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&stats.video_id)
        .bind(stats.total_views)
        .bind(stats.weekly_views)
        .bind(stats.monthly_views)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM videos WHERE is_active = TRUE) AS total_videos,
                (SELECT COALESCE(SUM(s.total_views), 0)::BIGINT
                   FROM video_stats s
                   INNER JOIN videos v ON v.id = s.video_id
                   WHERE v.is_active = TRUE) AS total_views,
                (SELECT COUNT(*) FROM categories) AS categories_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT * FROM groups ORDER BY group_name, group_value, group_type",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn groups_by_name(&self, group_name: &str) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT * FROM groups WHERE group_name = $1 ORDER BY group_value, group_type",
        )
        .bind(group_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn create_group(&self, group: GroupPayload) -> Result<Group, AppError> {
        let created = sqlx::query_as::<_, Group>(
            r#"INSERT INTO groups (id, group_name, group_type, group_value)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&group.group_name)
        .bind(&group.group_type)
        .bind(group.group_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_group(
        &self,
        id: &str,
        group: GroupPayload,
    ) -> Result<Option<Group>, AppError> {
        let updated = sqlx::query_as::<_, Group>(
            r#"UPDATE groups SET group_name = $2, group_type = $3, group_value = $4
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&group.group_name)
        .bind(&group.group_type)
        .bind(group.group_value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_group(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_favor_videos(&self) -> Result<Vec<FavorVideo>, AppError> {
        let favorites = sqlx::query_as::<_, FavorVideo>(
            "SELECT * FROM favor_videos ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }

    async fn get_favor_video(&self, id: &str) -> Result<Option<FavorVideo>, AppError> {
        let favorite = sqlx::query_as::<_, FavorVideo>("SELECT * FROM favor_videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(favorite)
    }

    async fn create_favor_video(&self, favor: FavorVideoPayload) -> Result<FavorVideo, AppError> {
        let created = sqlx::query_as::<_, FavorVideo>(
            r#"INSERT INTO favor_videos (id, title, youtube_link, description, category, "type", created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&favor.title)
        .bind(&favor.youtube_link)
        .bind(&favor.description)
        .bind(&favor.category)
        .bind(&favor.video_type)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_favor_video(
        &self,
        id: &str,
        favor: FavorVideoPayload,
    ) -> Result<Option<FavorVideo>, AppError> {
        let updated = sqlx::query_as::<_, FavorVideo>(
            r#"UPDATE favor_videos
               SET title = $2, youtube_link = $3, description = $4, category = $5, "type" = $6
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&favor.title)
        .bind(&favor.youtube_link)
        .bind(&favor.description)
        .bind(&favor.category)
        .bind(&favor.video_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_favor_video(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM favor_videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
