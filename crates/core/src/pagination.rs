//! Page-size clamping and the overfetch-then-filter page builder.
//!
//! Some filters (e.g. "any of these teams") cannot be expressed as a single
//! index query. Those pages are built by reading `limit * OVERFETCH_MULTIPLIER`
//! rows from the index, filtering in process, and truncating. The multiplier
//! is a heuristic: a sparse enough match distribution can still under-fill a
//! page, in which case the client simply follows the cursor.

use crate::store::{Page, PageKey};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 24;

/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Rows read from the index per requested row when filtering in process.
pub const OVERFETCH_MULTIPLIER: usize = 10;

/// Clamp a requested page size into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_PAGE_LIMIT,
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_PAGE_LIMIT, |n| n.min(MAX_PAGE_LIMIT)),
    }
}

/// Filter an overfetched page down to at most `limit` rows.
///
/// When the page fills up and rows remain beyond the last kept one (either
/// later in `raw` or behind the store's own cursor), the continuation key is
/// re-derived from the last *kept* row so the next page resumes right after
/// what the client saw. Otherwise every fetched row was examined and the
/// store's native key is forwarded unchanged.
pub fn overfetch_page<T>(
    raw: Page<T>,
    limit: usize,
    keep: impl Fn(&T) -> bool,
    key_of: impl Fn(&T) -> PageKey,
) -> Page<T> {
    let raw_len = raw.items.len();
    let mut kept = Vec::with_capacity(limit);
    let mut last_kept_pos = 0;

    for (pos, item) in raw.items.into_iter().enumerate() {
        if kept.len() == limit {
            break;
        }
        if keep(&item) {
            kept.push(item);
            last_kept_pos = pos;
        }
    }

    let more_after = last_kept_pos + 1 < raw_len || raw.next_key.is_some();
    let next_key = match kept.last() {
        Some(last) if kept.len() == limit && more_after => Some(key_of(last)),
        _ => raw.next_key,
    };

    Page {
        items: kept,
        next_key,
    }
}
