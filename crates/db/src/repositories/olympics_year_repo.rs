//! Repository for the gallery-protection columns of `olympics_years`.

use async_trait::async_trait;
use fieldday_core::error::CoreError;
use fieldday_core::store::{GalleryProtection, YearConfigStore};
use fieldday_core::types::Year;
use sqlx::PgPool;

use crate::models::olympics_year::GalleryProtectionRow;
use crate::repositories::internal;

pub struct OlympicsYearRepo;

impl OlympicsYearRepo {
    /// Load the protection columns of a year. `None` if the year does not exist.
    pub async fn find_protection(
        pool: &PgPool,
        year: Year,
    ) -> Result<Option<GalleryProtectionRow>, sqlx::Error> {
        sqlx::query_as::<_, GalleryProtectionRow>(
            "SELECT year, gallery_password_hash, gallery_token_secret \
             FROM olympics_years WHERE year = $1",
        )
        .bind(year)
        .fetch_optional(pool)
        .await
    }

    /// Set (or clear) the password hash and token secret together.
    ///
    /// Returns `true` if the year exists.
    pub async fn set_protection(
        pool: &PgPool,
        year: Year,
        password_hash: Option<&str>,
        token_secret: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE olympics_years SET \
                gallery_password_hash = $2, \
                gallery_token_secret = $3, \
                updated_at = NOW() \
             WHERE year = $1",
        )
        .bind(year)
        .bind(password_hash)
        .bind(token_secret)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// [`YearConfigStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgYearConfigStore {
    pool: PgPool,
}

impl PgYearConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl YearConfigStore for PgYearConfigStore {
    async fn find_protection(&self, year: Year) -> Result<Option<GalleryProtection>, CoreError> {
        let row = OlympicsYearRepo::find_protection(&self.pool, year)
            .await
            .map_err(internal("load gallery protection"))?;
        Ok(row.map(GalleryProtection::from))
    }

    async fn set_protection(&self, protection: &GalleryProtection) -> Result<bool, CoreError> {
        if protection.password_hash.is_some() != protection.token_secret.is_some() {
            return Err(CoreError::Internal(
                "password hash and token secret must be set together".to_string(),
            ));
        }
        OlympicsYearRepo::set_protection(
            &self.pool,
            protection.year,
            protection.password_hash.as_deref(),
            protection.token_secret.as_deref(),
        )
        .await
        .map_err(internal("update gallery protection"))
    }
}
