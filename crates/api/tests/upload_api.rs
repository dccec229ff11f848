//! HTTP-level tests for upload coordination and the reconcile round trip.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, wait_for_item, EVENT_SECRET};
use fieldday_core::media::{MediaStatus, MAX_IMAGE_BYTES, MAX_VIDEO_BYTES};
use fieldday_core::store::MediaCatalog;
use serde_json::json;

const UPLOAD_URI: &str = "/api/v1/gallery/2025/media/upload";

fn image_request(file_size: i64) -> serde_json::Value {
    json!({
        "fileName": "start-line.jpg",
        "fileSize": file_size,
        "mimeType": "image/jpeg",
        "type": "image",
    })
}

fn video_request(file_size: i64) -> serde_json::Value {
    json!({
        "fileName": "relay.mp4",
        "fileSize": file_size,
        "mimeType": "video/mp4",
        "type": "video",
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn size_boundaries_per_type() {
    let app = build_test_app().await;
    for (body, expected) in [
        (image_request(MAX_IMAGE_BYTES), StatusCode::OK),
        (image_request(MAX_IMAGE_BYTES + 1), StatusCode::BAD_REQUEST),
        (video_request(MAX_VIDEO_BYTES), StatusCode::OK),
        (video_request(MAX_VIDEO_BYTES + 1), StatusCode::BAD_REQUEST),
    ] {
        let response = post_json(app.app(), UPLOAD_URI, &[], body.clone()).await;
        assert_eq!(response.status(), expected, "{body}");
    }
}

#[tokio::test]
async fn missing_fields_are_reported_before_anything_else() {
    let app = build_test_app().await;
    let response = post_json(app.app(), UPLOAD_URI, &[], json!({ "type": "audio" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["message"],
        "Missing required fields: fileName, fileSize, mimeType"
    );
    assert!(app.catalog.is_empty().await);
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let app = build_test_app().await;
    let mut body = image_request(10);
    body["type"] = json!("audio");
    let response = post_json(app.app(), UPLOAD_URI, &[], body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("Invalid type"), "{message}");
}

#[tokio::test]
async fn invalid_json_uses_error_envelope() {
    let app = build_test_app().await;
    let response = post_json(app.app(), UPLOAD_URI, &[], json!({ "fileSize": "big" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Full round trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_then_reconcile_produces_ready_item() {
    let app = build_test_app().await;
    let mut request = image_request(4096);
    request["eventId"] = json!("ev-100m");
    request["teamIds"] = json!(["t1", "t2"]);
    request["persons"] = json!(["Alice"]);
    request["caption"] = json!("Photo finish");

    let response = post_json(app.app(), UPLOAD_URI, &[], request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let grant = body_json(response).await["data"].clone();
    let media_id = grant["mediaId"].as_str().unwrap().to_string();

    let uploads = &grant["uploads"];
    assert_eq!(uploads["original"]["method"], "PUT");
    assert_eq!(uploads["original"]["expiresInSecs"], 900);
    assert_eq!(uploads["original"]["headers"]["x-amz-meta-eventid"], "ev-100m");
    assert!(uploads["display"]["url"].is_string());

    // Provisional record is discoverable straight away.
    let pending = app.catalog.get(2025, &media_id).await.unwrap().unwrap();
    assert_eq!(pending.status, MediaStatus::Pending);

    // Client uploads siblings first, then the original.
    for asset in ["thumbnail", "display", "original"] {
        let key = uploads[asset]["key"].as_str().unwrap();
        assert!(app.objects.complete_upload(key, 4096).await, "{asset}");
    }
    let original_key = uploads["original"]["key"].as_str().unwrap();
    let response = post_json(
        app.app(),
        "/api/v1/internal/storage/object-created",
        &[("x-storage-event-secret", EVENT_SECRET)],
        json!({ "Records": [{ "s3": { "object": { "key": original_key } } }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let item = wait_for_item(&app, &media_id, |i| i.status == MediaStatus::Ready).await;
    assert_eq!(item.event_id.as_deref(), Some("ev-100m"));
    assert_eq!(item.team_id.as_deref(), Some("t1"));
    assert_eq!(item.caption.as_deref(), Some("Photo finish"));
    assert_eq!(item.original_file_name.as_deref(), Some("start-line.jpg"));
    assert_eq!(item.created_at, pending.created_at);

    let response = get(
        app.app(),
        &format!("/api/v1/gallery/2025/media/{media_id}"),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["status"], "ready");
    assert_eq!(view["type"], "image");
    assert_eq!(view["tags"]["persons"], json!(["Alice"]));
    assert!(view["originalUrl"].as_str().unwrap().contains("op=get"));
    assert!(view["thumbnailUrl"].is_string());
    assert!(view["displayUrl"].is_string());
}
