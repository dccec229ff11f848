//! Descriptive metadata carried on the stored original as object attributes.
//!
//! The upload flow signs these attributes into the original's write
//! permission; the reconciler reads them back from the stored object. The
//! values still come from the uploading client, so reading them back is
//! lenient and sanitising: anything malformed is dropped or truncated rather
//! than failing reconciliation.

use std::collections::HashMap;

use crate::media::{preview_extension, DEFAULT_PREVIEW_EXT};

/// Attribute names. Object stores lowercase user metadata keys.
pub mod keys {
    pub const EVENT_ID: &str = "eventid";
    pub const TEAM_ID: &str = "teamid";
    pub const TEAM_IDS: &str = "teamids";
    pub const PERSONS: &str = "persons";
    pub const UPLOADED_BY: &str = "uploadedby";
    pub const CAPTION: &str = "caption";
    pub const ORIGINAL_FILE_NAME: &str = "originalfilename";
    pub const THUMBNAIL_EXT: &str = "thumbext";
    pub const DISPLAY_EXT: &str = "displayext";
}

/// Longest identifier or name kept (characters).
pub const MAX_LABEL_LEN: usize = 200;

/// Longest caption kept (characters).
pub const MAX_CAPTION_LEN: usize = 1000;

/// Most entries kept from a list attribute.
pub const MAX_LIST_LEN: usize = 50;

/// Sanitised descriptive metadata for one media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    pub event_id: Option<String>,
    /// Legacy single-team attribute.
    pub team_id: Option<String>,
    pub team_ids: Vec<String>,
    pub persons: Vec<String>,
    pub uploaded_by: Option<String>,
    pub caption: Option<String>,
    pub original_file_name: Option<String>,
    pub thumbnail_ext: String,
    pub display_ext: String,
}

impl Default for EmbeddedMetadata {
    fn default() -> Self {
        Self {
            event_id: None,
            team_id: None,
            team_ids: Vec::new(),
            persons: Vec::new(),
            uploaded_by: None,
            caption: None,
            original_file_name: None,
            thumbnail_ext: DEFAULT_PREVIEW_EXT.to_string(),
            display_ext: DEFAULT_PREVIEW_EXT.to_string(),
        }
    }
}

impl EmbeddedMetadata {
    /// Read metadata back from a stored object's attribute map.
    pub fn from_object_metadata(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).map(|v| decode_value(v));

        Self {
            event_id: get(keys::EVENT_ID).and_then(|v| clean_label(&v, MAX_LABEL_LEN)),
            team_id: get(keys::TEAM_ID).and_then(|v| clean_label(&v, MAX_LABEL_LEN)),
            team_ids: get(keys::TEAM_IDS)
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            persons: get(keys::PERSONS).map(|v| parse_list(&v)).unwrap_or_default(),
            uploaded_by: get(keys::UPLOADED_BY).and_then(|v| clean_label(&v, MAX_LABEL_LEN)),
            caption: get(keys::CAPTION).and_then(|v| clean_label(&v, MAX_CAPTION_LEN)),
            original_file_name: get(keys::ORIGINAL_FILE_NAME)
                .and_then(|v| clean_label(&v, MAX_LABEL_LEN)),
            thumbnail_ext: preview_extension(map.get(keys::THUMBNAIL_EXT).map(String::as_str)),
            display_ext: preview_extension(map.get(keys::DISPLAY_EXT).map(String::as_str)),
        }
    }

    /// Render as an object attribute map. Values are restricted to printable
    /// ASCII so they survive as HTTP headers.
    pub fn to_object_metadata(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let mut put = |key: &str, value: String| {
            map.insert(key.to_string(), urlencoding::encode(&value).into_owned());
        };

        if let Some(v) = &self.event_id {
            put(keys::EVENT_ID, v.clone());
        }
        if let Some(v) = &self.team_id {
            put(keys::TEAM_ID, v.clone());
        }
        if !self.team_ids.is_empty() {
            put(keys::TEAM_IDS, list_json(&self.team_ids));
        }
        if !self.persons.is_empty() {
            put(keys::PERSONS, list_json(&self.persons));
        }
        if let Some(v) = &self.uploaded_by {
            put(keys::UPLOADED_BY, v.clone());
        }
        if let Some(v) = &self.caption {
            put(keys::CAPTION, v.clone());
        }
        if let Some(v) = &self.original_file_name {
            put(keys::ORIGINAL_FILE_NAME, v.clone());
        }
        put(keys::THUMBNAIL_EXT, self.thumbnail_ext.clone());
        put(keys::DISPLAY_EXT, self.display_ext.clone());
        map
    }

    /// The canonical single team reference: the first listed team, falling
    /// back to the legacy attribute.
    pub fn canonical_team_id(&self) -> Option<String> {
        self.team_ids.first().cloned().or_else(|| self.team_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Value sanitising
// ---------------------------------------------------------------------------

/// Trim, strip control characters, truncate. Empty results become `None`.
pub fn clean_label(raw: &str, max_len: usize) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(max_len)
        .collect();
    let cleaned = cleaned.trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse a list attribute: a JSON array of strings, or a comma-separated
/// string. Non-string entries are ignored; duplicates are dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    let entries: Vec<String> = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(serde_json::Value::String(s)) => vec![s],
        _ => raw.split(',').map(str::to_string).collect(),
    };
    clean_list(entries)
}

/// Clean every entry of a list and drop empties and duplicates.
pub fn clean_list<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        if out.len() >= MAX_LIST_LEN {
            break;
        }
        if let Some(v) = clean_label(entry.as_ref(), MAX_LABEL_LEN) {
            if !out.contains(&v) {
                out.push(v);
            }
        }
    }
    out
}

fn list_json(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

// ---------------------------------------------------------------------------
// Percent encoding
// ---------------------------------------------------------------------------

/// Decode an attribute value, keeping the raw text if its escapes do not
/// decode to UTF-8. Stray `%` signs without two hex digits stay literal.
fn decode_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_lists_from_json_arrays() {
        let meta = EmbeddedMetadata::from_object_metadata(&map(&[
            ("eventid", "ev-1"),
            ("teamids", r#"["t1","t2"]"#),
            ("persons", r#"["Alice"]"#),
        ]));
        assert_eq!(meta.event_id.as_deref(), Some("ev-1"));
        assert_eq!(meta.team_ids, vec!["t1", "t2"]);
        assert_eq!(meta.persons, vec!["Alice"]);
        assert_eq!(meta.canonical_team_id().as_deref(), Some("t1"));
        assert_eq!(meta.thumbnail_ext, DEFAULT_PREVIEW_EXT);
    }

    #[test]
    fn reads_comma_separated_lists() {
        let meta = EmbeddedMetadata::from_object_metadata(&map(&[("teamids", " t1, ,t2,t1 ")]));
        assert_eq!(meta.team_ids, vec!["t1", "t2"]);
    }

    #[test]
    fn legacy_team_id_is_canonical_without_list() {
        let meta = EmbeddedMetadata::from_object_metadata(&map(&[("teamid", "t7")]));
        assert!(meta.team_ids.is_empty());
        assert_eq!(meta.canonical_team_id().as_deref(), Some("t7"));
    }

    #[test]
    fn hostile_values_are_sanitised() {
        let long = "x".repeat(5_000);
        let meta = EmbeddedMetadata::from_object_metadata(&map(&[
            ("eventid", "   "),
            ("caption", &long),
            ("persons", r#"[1, null, "Bob\u0007", {"a":1}]"#),
            ("thumbext", "../../etc/passwd"),
            ("displayext", "PNG"),
        ]));
        assert!(meta.event_id.is_none());
        assert_eq!(meta.caption.unwrap().chars().count(), MAX_CAPTION_LEN);
        assert_eq!(meta.persons, vec!["Bob"]);
        assert_eq!(meta.thumbnail_ext, DEFAULT_PREVIEW_EXT);
        assert_eq!(meta.display_ext, "png");
    }

    #[test]
    fn list_length_is_capped() {
        let many: Vec<String> = (0..200).map(|i| format!("p{i}")).collect();
        assert_eq!(clean_list(many).len(), MAX_LIST_LEN);
    }

    #[test]
    fn attribute_map_survives_a_store_round_trip() {
        let meta = EmbeddedMetadata {
            event_id: Some("ev-1".into()),
            team_id: None,
            team_ids: vec!["t1".into(), "t2".into()],
            persons: vec!["Zoë".into()],
            uploaded_by: Some("coach".into()),
            caption: Some("Ziel à 100% effort".into()),
            original_file_name: Some("IMG_0001.HEIC".into()),
            thumbnail_ext: "webp".into(),
            display_ext: "jpg".into(),
        };
        let attrs = meta.to_object_metadata();
        assert!(attrs
            .values()
            .all(|v| v.bytes().all(|b| (0x20..=0x7e).contains(&b))));
        assert_eq!(EmbeddedMetadata::from_object_metadata(&attrs), meta);
    }

    #[test]
    fn attribute_values_decode_tolerantly() {
        assert_eq!(decode_value("a%20b"), "a b");
        assert_eq!(decode_value("%C3%A9"), "é");
        assert_eq!(decode_value("100%"), "100%");
        assert_eq!(decode_value("%zz"), "%zz");
        assert_eq!(decode_value("%+1"), "%+1");
        // Lone continuation byte: not UTF-8, kept as sent.
        assert_eq!(decode_value("%80"), "%80");
    }
}
