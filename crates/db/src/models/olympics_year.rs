//! Row type for the `olympics_years` table (gallery-protection columns).

use fieldday_core::store::GalleryProtection;
use fieldday_core::types::Year;
use sqlx::FromRow;

/// The gallery-protection columns of an `olympics_years` row.
#[derive(Debug, Clone, FromRow)]
pub struct GalleryProtectionRow {
    pub year: Year,
    pub gallery_password_hash: Option<String>,
    pub gallery_token_secret: Option<String>,
}

impl From<GalleryProtectionRow> for GalleryProtection {
    fn from(row: GalleryProtectionRow) -> Self {
        Self {
            year: row.year,
            password_hash: row.gallery_password_hash,
            token_secret: row.gallery_token_secret,
        }
    }
}
