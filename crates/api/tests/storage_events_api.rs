//! HTTP-level tests for object-created notifications.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json, wait_for_item, EVENT_SECRET};
use fieldday_core::media::{MediaStatus, MediaType};
use fieldday_core::storage::ObjectAttributes;
use serde_json::json;

const NOTIFY_URI: &str = "/api/v1/internal/storage/object-created";

fn notification(keys: &[&str]) -> serde_json::Value {
    let records: Vec<_> = keys
        .iter()
        .map(|key| json!({ "eventName": "ObjectCreated:Put", "s3": { "object": { "key": key } } }))
        .collect();
    json!({ "Records": records })
}

#[tokio::test]
async fn reconciles_embedded_metadata() {
    let app = build_test_app().await;
    app.objects
        .insert(
            "2025/originals/media-abc.jpg",
            ObjectAttributes {
                content_type: Some("image/jpeg".into()),
                size: Some(1_000),
                metadata: HashMap::from([
                    ("eventid".to_string(), "ev-1".to_string()),
                    ("teamids".to_string(), r#"["t1","t2"]"#.to_string()),
                    ("persons".to_string(), r#"["Alice"]"#.to_string()),
                ]),
            },
        )
        .await;

    let response = post_json(
        app.app(),
        NOTIFY_URI,
        &[("x-storage-event-secret", EVENT_SECRET)],
        notification(&["2025/originals/media-abc.jpg"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["data"]["accepted"], 1);

    let item = wait_for_item(&app, "media-abc", |_| true).await;
    assert_eq!(item.media_type, MediaType::Image);
    assert_eq!(item.event_id.as_deref(), Some("ev-1"));
    assert_eq!(item.team_id.as_deref(), Some("t1"));
    assert_eq!(item.team_ids, vec!["t1".to_string(), "t2".to_string()]);
    assert_eq!(item.tags.persons, vec!["Alice".to_string()]);
    assert!(item.thumbnail_key.is_some());
    assert!(item.display_key.is_some());
}

#[tokio::test]
async fn failed_attribute_fetch_still_records_the_item() {
    let app = build_test_app().await;
    app.objects
        .insert("2025/originals/media-x.mp4", ObjectAttributes::default())
        .await;
    app.objects.set_fail_head(true);

    let response = post_json(
        app.app(),
        NOTIFY_URI,
        &[("x-storage-event-secret", EVENT_SECRET)],
        notification(&["2025/originals/media-x.mp4"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let item = wait_for_item(&app, "media-x", |_| true).await;
    assert_eq!(item.status, MediaStatus::Degraded);
    assert_eq!(item.year, 2025);
    assert_eq!(item.media_type, MediaType::Video);
    assert_eq!(item.original_key, "2025/originals/media-x.mp4");
}

#[tokio::test]
async fn bad_secret_is_rejected() {
    let app = build_test_app().await;
    let response = post_json(
        app.app(),
        NOTIFY_URI,
        &[("x-storage-event-secret", "nope")],
        notification(&["2025/originals/media-abc.jpg"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreadable_or_foreign_notifications_are_acknowledged() {
    let app = build_test_app().await;
    let headers = [("x-storage-event-secret", EVENT_SECRET)];

    let response = post_json(app.app(), NOTIFY_URI, &headers, json!({ "Records": "nope" })).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["data"]["accepted"], 0);

    let response = post_json(
        app.app(),
        NOTIFY_URI,
        &headers,
        notification(&["2025/thumbnails/media-abc.jpg", "junk"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.catalog.is_empty().await);
}

#[tokio::test]
async fn notified_original_missing_from_storage_is_cataloged_degraded() {
    let app = build_test_app().await;

    let response = post_json(
        app.app(),
        NOTIFY_URI,
        &[("x-storage-event-secret", EVENT_SECRET)],
        notification(&["2025/originals/media-abc.mp4"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let item = wait_for_item(&app, "media-abc", |_| true).await;
    assert_eq!(item.status, MediaStatus::Degraded);
    assert_eq!(item.media_type, MediaType::Video);
    assert_eq!(item.original_key, "2025/originals/media-abc.mp4");
}
