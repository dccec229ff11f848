//! HTTP-level tests for listing, reading, editing and deleting media.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, patch_json, ready_image, seed, TestApp};
use fieldday_core::storage::ObjectAttributes;
use serde_json::json;

async fn list(app: &TestApp, query: &str) -> serde_json::Value {
    let response = get(app.app(), &format!("/api/v1/gallery/2025/media?{query}"), &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

fn ids(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["mediaId"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pages_through_five_items_two_at_a_time() {
    let app = build_test_app().await;
    for i in 0..5 {
        seed(&app, &ready_image(&format!("media-{i}"), 1_000 + i)).await;
    }

    let first = list(&app, "limit=2").await;
    assert_eq!(ids(&first), vec!["media-4", "media-3"]);
    let cursor = first["nextToken"].as_str().unwrap().to_string();
    assert!(!cursor.is_empty());

    let second = list(&app, &format!("limit=2&nextToken={cursor}")).await;
    assert_eq!(ids(&second), vec!["media-2", "media-1"]);
    let cursor = second["nextToken"].as_str().unwrap().to_string();

    let third = list(&app, &format!("limit=2&nextToken={cursor}")).await;
    assert_eq!(ids(&third), vec!["media-0"]);
    assert!(third["nextToken"].is_null());
}

#[tokio::test]
async fn tampered_cursor_restarts_from_the_beginning() {
    let app = build_test_app().await;
    for i in 0..3 {
        seed(&app, &ready_image(&format!("media-{i}"), 1_000 + i)).await;
    }
    let first = list(&app, "limit=1").await;
    let cursor = first["nextToken"].as_str().unwrap();
    let truncated = &cursor[..cursor.len() / 2];

    for bad in [truncated, "!!!!", "e30"] {
        let page = list(&app, &format!("limit=1&nextToken={bad}")).await;
        assert_eq!(ids(&page), vec!["media-2"], "cursor {bad:?}");
    }
}

#[tokio::test]
async fn limit_is_clamped() {
    let app = build_test_app().await;
    for i in 0..3 {
        seed(&app, &ready_image(&format!("media-{i}"), 1_000 + i)).await;
    }
    assert_eq!(ids(&list(&app, "limit=0").await).len(), 1);
    assert_eq!(ids(&list(&app, "limit=5000").await).len(), 3);

    let response = get(app.app(), "/api/v1/gallery/2025/media?limit=lots", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn team_filter_overfetch_does_not_repeat_items() {
    let app = build_test_app().await;
    let mut newest = ready_image("media-new", 3_000);
    newest.team_ids = vec!["t1".into()];
    seed(&app, &newest).await;
    seed(&app, &ready_image("media-mid", 2_000)).await;
    seed(&app, &ready_image("media-old", 1_000)).await;

    let first = list(&app, "teamId=t1&limit=1").await;
    assert_eq!(ids(&first), vec!["media-new"]);
    let cursor = first["nextToken"].as_str().unwrap().to_string();

    let second = list(&app, &format!("teamId=t1&limit=1&nextToken={cursor}")).await;
    assert!(ids(&second).is_empty());
    assert!(second["nextToken"].is_null());
}

#[tokio::test]
async fn event_and_person_filters() {
    let app = build_test_app().await;
    let mut at_event = ready_image("media-event", 3_000);
    at_event.event_id = Some("ev-1".into());
    at_event.tags.persons = vec!["Alice Martin".into()];
    seed(&app, &at_event).await;
    let mut elsewhere = ready_image("media-other", 2_000);
    elsewhere.tags.persons = vec!["Bob".into()];
    seed(&app, &elsewhere).await;

    assert_eq!(ids(&list(&app, "eventId=ev-1").await), vec!["media-event"]);
    assert_eq!(ids(&list(&app, "person=alice").await), vec!["media-event"]);
    assert_eq!(ids(&list(&app, "person=BOB").await), vec!["media-other"]);
    assert!(ids(&list(&app, "eventId=ev-1&person=bob").await).is_empty());
}

#[tokio::test]
async fn items_without_previews_are_hidden() {
    let app = build_test_app().await;
    let mut bare = ready_image("media-bare", 2_000);
    bare.thumbnail_key = None;
    bare.display_key = None;
    seed(&app, &bare).await;
    seed(&app, &ready_image("media-shown", 1_000)).await;

    assert_eq!(ids(&list(&app, "").await), vec!["media-shown"]);
}

// ---------------------------------------------------------------------------
// Get / edit / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_missing_item_is_not_found() {
    let app = build_test_app().await;
    let response = get(app.app(), "/api/v1/gallery/2025/media/media-nope", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn patch_updates_caption_and_persons() {
    let app = build_test_app().await;
    seed(&app, &ready_image("media-1", 1_000)).await;

    let response = patch_json(
        app.app(),
        "/api/v1/gallery/2025/media/media-1",
        &[],
        json!({ "caption": "Anchor leg", "persons": ["Chloé", "Dev"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["caption"], "Anchor leg");
    assert_eq!(view["tags"]["persons"], json!(["Chloé", "Dev"]));
    assert!(view["thumbnailUrl"].is_string());

    let response = patch_json(
        app.app(),
        "/api/v1/gallery/2025/media/media-1",
        &[],
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_record_and_stored_objects() {
    let app = build_test_app().await;
    let item = ready_image("media-1", 1_000);
    seed(&app, &item).await;
    for key in item.storage_keys() {
        app.objects.insert(key, ObjectAttributes::default()).await;
    }

    let response = delete(app.app(), "/api/v1/gallery/2025/media/media-1", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"],
        json!({ "mediaId": "media-1", "deleted": true })
    );
    assert!(app.catalog.is_empty().await);
    for key in item.storage_keys() {
        assert!(!app.objects.contains(key).await, "{key}");
    }

    let response = delete(app.app(), "/api/v1/gallery/2025/media/media-1", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
