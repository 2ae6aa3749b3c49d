//! Integration tests for the Axum web server.
//!
//! These run against a real router wired through `bootstrap` with a
//! temporary database and media directory. The encoder path points at a
//! nonexistent binary, so start requests exercise the spawn-failure path.

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use castctl_axum::bootstrap::{CorsConfig, ServerConfig, bootstrap};
use castctl_axum::routes::create_router;

const SECRET_CODE: &str = "test-code";

fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        port: 0, // Not used in tests
        database_path: dir.path().join("castctl.db"),
        media_dir: dir.path().join("videos"),
        encoder_path: "/nonexistent/ffmpeg".into(),
        secret_code: SECRET_CODE.to_string(),
        drive_api_key: None,
        static_dir: None,
        cors: CorsConfig::AllowAll,
    }
}

async fn test_app(dir: &TempDir) -> Router {
    let ctx = bootstrap(test_config(dir)).await.expect("bootstrap failed");
    create_router(ctx, &CorsConfig::AllowAll)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register and log in, returning the session cookie.
async fn login(app: &Router) -> String {
    let response = send_json(
        app,
        "POST",
        "/auth/register",
        Some(json!({
            "username": "admin",
            "password": "hunter2",
            "secret_code": SECRET_CODE,
        })),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(
        app,
        "POST",
        "/auth/login",
        Some(json!({"username": "admin", "password": "hunter2"})),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("login did not set a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = send_json(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn api_routes_require_a_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    for uri in ["/api/streams", "/api/videos", "/api/me"] {
        let response = send_json(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn register_rejects_wrong_secret_code() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        Some(json!({"username": "x", "password": "y", "secret_code": "wrong"})),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let _cookie = login(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"username": "admin", "password": "wrong"})),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_identifies_the_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(&app, "GET", "/api/me", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["user_id"].as_i64().unwrap() > 0);
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(&app, "POST", "/auth/logout", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(&app, "GET", "/api/me", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stream_crud_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    // Create
    let response = send_json(
        &app,
        "POST",
        "/api/streams",
        Some(json!({
            "title": "lofi loop",
            "video": "lofi.mp4",
            "rtmp_url": "rtmp://a.rtmp.example.com/live",
            "stream_key": "abcd-1234",
            "looping": true,
        })),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "stopped");

    // List: one entry, read-repaired status is stopped
    let response = send_json(&app, "GET", "/api/streams", None, Some(&cookie)).await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["status"], "stopped");

    // Update
    let response = send_json(
        &app,
        "PUT",
        &format!("/api/streams/{id}"),
        Some(json!({
            "title": "lofi loop v2",
            "video": "lofi.mp4",
            "rtmp_url": "rtmp://a.rtmp.example.com/live",
            "stream_key": "abcd-1234",
            "looping": false,
            "duration_secs": 120,
        })),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "lofi loop v2");
    assert_eq!(updated["duration_secs"], 120);

    // Delete
    let response = send_json(
        &app,
        "DELETE",
        &format!("/api/streams/{id}"),
        None,
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(&app, "GET", "/api/streams", None, Some(&cookie)).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_stream_validates_input() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/api/streams",
        Some(json!({
            "title": "",
            "video": "a.mp4",
            "rtmp_url": "rtmp://x",
            "stream_key": "k",
        })),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_surfaces_spawn_failure_without_marking_running() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/api/streams",
        Some(json!({
            "title": "s",
            "video": "a.mp4",
            "rtmp_url": "rtmp://x",
            "stream_key": "k",
        })),
        Some(&cookie),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    // Encoder binary doesn't exist: the caller must not be told running
    let response = send_json(
        &app,
        "POST",
        &format!("/api/streams/{id}/start"),
        None,
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = send_json(&app, "GET", "/api/streams", None, Some(&cookie)).await;
    assert_eq!(body_json(response).await[0]["status"], "stopped");
}

#[tokio::test]
async fn start_of_missing_stream_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(&app, "POST", "/api/streams/999/start", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stop_of_idle_stream_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(&app, "POST", "/api/streams/999/stop", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "stopped");
}

#[tokio::test]
async fn video_library_listing_and_validation() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    // Fresh media dir: nothing to list
    let response = send_json(&app, "GET", "/api/videos", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    // Deleting a missing file is 404
    let response = send_json(&app, "DELETE", "/api/videos/nope.mp4", None, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Renaming to an invalid target name is rejected
    std::fs::write(dir.path().join("videos").join("clip.mp4"), b"fake").unwrap();
    let response = send_json(
        &app,
        "PUT",
        "/api/videos/clip.mp4",
        Some(json!({"new_name": "../escape.mp4"})),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // And a valid rename works
    let response = send_json(
        &app,
        "PUT",
        "/api/videos/clip.mp4",
        Some(json!({"new_name": "renamed.mp4"})),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(&app, "GET", "/api/videos", None, Some(&cookie)).await;
    assert_eq!(body_json(response).await, json!(["renamed.mp4"]));
}

#[tokio::test]
async fn drive_import_without_api_key_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let cookie = login(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/api/videos/drive",
        Some(json!({"url": "https://drive.google.com/file/d/abc123/view"})),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
