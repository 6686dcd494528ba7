//! Catalog REST endpoints.

pub mod categories;
pub mod favor_videos;
pub mod groups;
pub mod stats;
pub mod videos;

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::InnerState;

#[tracing::instrument(name = "create_v1_router", skip(state))]
pub fn create_v1_router(state: InnerState) -> Router {
    tracing::info!("Creating catalog API router");

    Router::new()
        .route("/api/videos", get(videos::all_videos).post(videos::create_video))
        .route("/api/videos/category/:category", get(videos::videos_by_category))
        .route("/api/videos/top", get(videos::top_videos))
        .route("/api/videos/top/:category", get(videos::top_videos_by_category))
        .route("/api/videos/search/:category", get(videos::search_videos))
        .route("/api/videos/populate", post(videos::populate_videos))
        .route("/api/videos/refresh-stats", post(videos::refresh_stats))
        .route(
            "/api/videos/:id",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )

        .route(
            "/api/categories",
            get(categories::all_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/:id",
            patch(categories::update_category).delete(categories::delete_category),
        )

        .route("/api/stats/dashboard", get(stats::dashboard))
        .route("/api/stats/:video_id", patch(stats::update_video_stats))

        .route("/api/groups", get(groups::all_groups).post(groups::create_group))
        .route("/api/groups/type/:type", get(groups::groups_by_type))
        .route(
            "/api/groups/:id",
            put(groups::update_group).delete(groups::delete_group),
        )

        .route(
            "/api/favor-videos",
            get(favor_videos::all_favor_videos).post(favor_videos::create_favor_video),
        )
        .route(
            "/api/favor-videos/:id",
            get(favor_videos::get_favor_video)
                .put(favor_videos::update_favor_video)
                .delete(favor_videos::delete_favor_video),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;
    use crate::storage::MemoryStorage;
    use crate::youtube::{MockVideoSource, SearchHit, VideoDetails};

    fn app_with(source: MockVideoSource) -> Router {
        let state = InnerState::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(source),
            Settings::default(),
        );
        create_v1_router(state)
    }

    fn app() -> Router {
        app_with(MockVideoSource::new())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn video_body(youtube_id: &str) -> Value {
        json!({
            "title": "Amazing Grace",
            "youtubeId": youtube_id,
            "thumbnailUrl": format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", youtube_id),
            "duration": "4:32",
            "category": "Music",
            "keywords": ["hymn"],
            "publishedAt": "2023-12-15T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn video_soft_delete_lifecycle() {
        let app = app();
        let (status, created) = send(&app, Method::POST, "/api/videos", Some(video_body("CDdvReNKKuk"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["category"], "music");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = send(&app, Method::GET, "/api/videos/category/Music", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/videos/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listed) = send(&app, Method::GET, "/api/videos", None).await;
        assert!(listed.as_array().unwrap().is_empty());

        let (status, _) = send(&app, Method::DELETE, &format!("/api/videos/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = send(&app, Method::GET, &format!("/api/videos/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn video_validation_and_bad_json() {
        let app = app();
        let mut body = video_body("x");
        body["title"] = json!("");
        let (status, response) = send(&app, Method::POST, "/api/videos", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["errors"]["title"].is_array());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/videos")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, "/api/videos", Some(video_body("dup"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, Method::POST, "/api/videos", Some(video_body("dup"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn patch_only_touches_given_fields() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/videos", Some(video_body("abc"))).await;
        let uri = format!("/api/videos/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "title": "Renamed" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Renamed");
        assert_eq!(updated["duration"], "4:32");

        let (status, _) = send(&app, Method::PATCH, "/api/videos/missing", Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn categories_are_unique_and_hard_deleted() {
        let app = app();
        let category = json!({ "name": "Music", "keywords": ["worship", "hymn"] });
        let (status, created) = send(&app, Method::POST, "/api/categories", Some(category.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, Method::POST, "/api/categories", Some(category)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let uri = format!("/api/categories/{}", created["id"].as_str().unwrap());
        let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "keywords": ["praise"] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["keywords"], json!(["praise"]));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_patch_creates_then_updates() {
        let app = app();
        let (_, video) = send(&app, Method::POST, "/api/videos", Some(video_body("s1"))).await;
        let uri = format!("/api/stats/{}", video["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "weeklyViews": 3 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, stats) = send(&app, Method::PATCH, &uri, Some(json!({ "totalViews": 1500 }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stats["totalViews"], 1500);

        let (status, stats) = send(&app, Method::PATCH, &uri, Some(json!({ "weeklyViews": 3 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalViews"], 1500);
        assert_eq!(stats["weeklyViews"], 3);

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "monthlyViews": -1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::PATCH, "/api/stats/nope", Some(json!({ "totalViews": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, dashboard) = send(&app, Method::GET, "/api/stats/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["totalVideos"], 1);
        assert_eq!(dashboard["totalViews"], 1500);
        assert_eq!(dashboard["totalViewsText"], "1.5K");
        assert_eq!(dashboard["categoriesCount"], 0);
    }

    #[tokio::test]
    async fn top_videos_follow_total_views() {
        let app = app();
        for (youtube_id, views) in [("low", 10), ("high", 900), ("mid", 300)] {
            let (_, video) = send(&app, Method::POST, "/api/videos", Some(video_body(youtube_id))).await;
            let uri = format!("/api/stats/{}", video["id"].as_str().unwrap());
            send(&app, Method::PATCH, &uri, Some(json!({ "totalViews": views }))).await;
        }

        let (status, top) = send(&app, Method::GET, "/api/videos/top?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = top
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["youtubeId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["high", "mid"]);

        let (_, top) = send(&app, Method::GET, "/api/videos/top/sermon", None).await;
        assert!(top.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn groups_filter_by_list_name() {
        let app = app();
        for (name, label, value) in [("Category", "Worship", 1), ("Type", "Live", 1), ("Category", "Sermon", 2)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/groups",
                Some(json!({ "groupName": name, "groupType": label, "groupValue": value })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, groups) = send(&app, Method::GET, "/api/groups/type/Category", None).await;
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g["groupName"] == "Category"));

        let id = groups[0]["id"].as_str().unwrap();
        let uri = format!("/api/groups/{}", id);
        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "groupName": "Category", "groupType": "Praise", "groupValue": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["groupType"], "Praise");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn favor_videos_crud() {
        let app = app();
        let favorite = json!({
            "title": "Oceans",
            "youTubeLink": "https://www.youtube.com/watch?v=dy9nwe9_xzw",
            "category": "Worship",
            "type": "Live"
        });
        let (status, created) = send(&app, Method::POST, "/api/favor-videos", Some(favorite)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["type"], "Live");
        let uri = format!("/api/favor-videos/{}", created["id"].as_str().unwrap());

        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["youTubeLink"], "https://www.youtube.com/watch?v=dy9nwe9_xzw");

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "title": "", "youTubeLink": "x", "category": "c", "type": "t" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_endpoint_formats_for_the_requested_language() {
        let mut source = MockVideoSource::new();
        source
            .expect_search()
            .withf(|req| req.query == "+worship +hymn" && req.max_results == 5)
            .times(1)
            .returning(|_| {
                Ok(vec![SearchHit {
                    youtube_id: "CDdvReNKKuk".into(),
                    title: "Amazing Grace".into(),
                    description: "Classic hymn".into(),
                    thumbnail_url: "https://i.ytimg.com/vi/CDdvReNKKuk/hqdefault.jpg".into(),
                    published_at: Utc::now() - Duration::days(14),
                }])
            });
        source.expect_video_details().times(1).returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| VideoDetails {
                    youtube_id: id.clone(),
                    duration: "4:32".into(),
                    view_count: 1_500,
                })
                .collect())
        });
        let app = app_with(source);
        send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "Music", "keywords": ["worship", "hymn"] })),
        )
        .await;

        let (status, results) = send(&app, Method::GET, "/api/videos/search/music?limit=5&lang=es", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results[0]["youtubeId"], "CDdvReNKKuk");
        assert_eq!(results[0]["viewCountText"], "1.5K visualizaciones");
        assert_eq!(results[0]["publishedText"], "hace 2 semanas");

        let (_, stored) = send(&app, Method::GET, "/api/videos", None).await;
        assert!(stored.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn populate_reports_per_category() {
        let mut source = MockVideoSource::new();
        source.expect_search().times(0);
        let app = app_with(source);
        send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Other", "keywords": [] }))).await;

        let (status, report) = send(&app, Method::POST, "/api/videos/populate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["categories"][0]["outcome"], "skippedNoKeywords");
        assert_eq!(report["totalInserted"], 0);

        let (status, refreshed) = send(&app, Method::POST, "/api/videos/refresh-stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refreshed["updated"], 0);
    }
}
