#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fieldday_api::config::{GalleryBackend, ServerConfig};
use fieldday_api::router::build_app_router;
use fieldday_api::state::AppState;
use fieldday_cloud::InMemoryObjectStore;
use fieldday_core::media::{MediaItem, MediaStatus, MediaType};
use fieldday_core::store::{GalleryProtection, MediaCatalog};
use fieldday_core::types::Year;
use fieldday_db::memory::{InMemoryCatalog, InMemoryYearConfigs};

pub const YEAR: Year = 2025;
pub const ADMIN_KEY: &str = "test-admin-key";
pub const EVENT_SECRET: &str = "test-event-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        cors_max_age_secs: 600,
        request_timeout_secs: 30,
        admin_api_key: Some(ADMIN_KEY.to_string()),
        storage_event_secret: Some(EVENT_SECRET.to_string()),
        backend: GalleryBackend::Memory {
            public_base_url: "http://storage.test".to_string(),
        },
    }
}

/// The application router plus handles on the in-memory stores behind it,
/// so tests can seed data and inspect side effects.
pub struct TestApp {
    router: Router,
    pub years: Arc<InMemoryYearConfigs>,
    pub catalog: Arc<InMemoryCatalog>,
    pub objects: Arc<InMemoryObjectStore>,
}

impl TestApp {
    /// A fresh router handle; `oneshot` consumes it.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Full application over in-memory stores with [`YEAR`] registered as an
/// open gallery.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config()).await
}

pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let years = Arc::new(InMemoryYearConfigs::new());
    years.insert(GalleryProtection::open(YEAR)).await;
    let catalog = Arc::new(InMemoryCatalog::new());
    let objects = Arc::new(InMemoryObjectStore::new("http://storage.test"));

    let state = AppState {
        config: Arc::new(config.clone()),
        years: years.clone(),
        catalog: catalog.clone(),
        objects: objects.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        years,
        catalog,
        objects,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    send(app, Method::GET, uri, headers, None).await
}

pub async fn delete(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    send(app, Method::DELETE, uri, headers, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, headers, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, headers, Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, headers, Some(body)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// A reconciled image created at `secs` (Unix seconds), with a thumbnail.
pub fn ready_image(media_id: &str, secs: i64) -> MediaItem {
    let at = chrono::DateTime::from_timestamp(secs, 0).unwrap();
    let mut item = MediaItem::minimal(
        YEAR,
        media_id,
        MediaType::Image,
        &format!("{YEAR}/originals/{media_id}.jpg"),
        MediaStatus::Ready,
        at,
    );
    item.thumbnail_key = Some(format!("{YEAR}/thumbnails/{media_id}.jpg"));
    item.display_key = Some(format!("{YEAR}/displays/{media_id}.jpg"));
    item
}

pub async fn seed(app: &TestApp, item: &MediaItem) {
    app.catalog.put(item).await.unwrap();
}

/// Poll the catalog until `predicate` holds for the item, for up to ~2s.
/// Reconciliation runs on a spawned task.
pub async fn wait_for_item(
    app: &TestApp,
    media_id: &str,
    predicate: impl Fn(&MediaItem) -> bool,
) -> MediaItem {
    for _ in 0..100 {
        if let Some(item) = app.catalog.get(YEAR, media_id).await.unwrap() {
            if predicate(&item) {
                return item;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("media item {media_id} never reached the expected state");
}
