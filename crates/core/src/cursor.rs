//! Opaque continuation cursors.
//!
//! A cursor is the store's native [`PageKey`] serialised as JSON and
//! base64url-encoded without padding, so it can travel in a query string.
//! Decoding never fails: anything that does not decode to a non-empty key
//! map means "start from the beginning".

use base64::prelude::*;

use crate::store::PageKey;

/// Encode a page key as an opaque cursor string.
pub fn encode_cursor(key: &PageKey) -> String {
    let object: serde_json::Map<String, serde_json::Value> = key
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    let json = serde_json::Value::Object(object).to_string();
    BASE64_URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cursor. Absent, empty, or malformed cursors yield `None`.
pub fn decode_cursor(cursor: Option<&str>) -> Option<PageKey> {
    let raw = cursor?.trim().trim_end_matches('=');
    if raw.is_empty() {
        return None;
    }
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(raw).ok()?;
    let key: PageKey = serde_json::from_slice(&bytes).ok()?;
    (!key.is_empty()).then_some(key)
}
