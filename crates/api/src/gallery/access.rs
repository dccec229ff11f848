//! Access Guard.
//!
//! A year's gallery is either open (no password hash stored) or protected.
//! Protected galleries require an `X-Gallery-Token` minted by
//! [`AccessGuard::validate_password`]. Unknown years are always denied.

use std::sync::Arc;

use fieldday_core::error::CoreError;
use fieldday_core::gallery_token::{self, IssuedToken};
use fieldday_core::store::{GalleryProtection, YearConfigStore};
use fieldday_core::types::{unix_now, Year};

use crate::auth::password::verify_password_blocking;

/// Result of a password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordOutcome {
    /// Password accepted (or the gallery is open); here is a token.
    Granted(IssuedToken),
    /// Password did not match the stored hash.
    Rejected,
}

pub struct AccessGuard {
    years: Arc<dyn YearConfigStore>,
}

impl AccessGuard {
    pub fn new(years: Arc<dyn YearConfigStore>) -> Self {
        Self { years }
    }

    /// Decide whether a request for `year` carrying `token` may proceed.
    pub async fn check(&self, year: Year, token: Option<&str>, now: i64) -> Result<bool, CoreError> {
        let Some(protection) = self.years.find_protection(year).await? else {
            return Ok(false);
        };
        Ok(token_grants(&protection, token, now))
    }

    /// Like [`check`](Self::check) at the current time, turning a denial
    /// into [`CoreError::Unauthorized`].
    pub async fn authorize(&self, year: Year, token: Option<&str>) -> Result<(), CoreError> {
        if self.check(year, token, unix_now()).await? {
            Ok(())
        } else {
            tracing::debug!(year, has_token = token.is_some(), "Gallery access denied");
            Err(CoreError::Unauthorized(
                "Missing, invalid or expired gallery token".into(),
            ))
        }
    }

    /// Exchange a password for an access token.
    ///
    /// Open galleries hand out a token without looking at the password.
    pub async fn validate_password(
        &self,
        year: Year,
        password: Option<&str>,
    ) -> Result<PasswordOutcome, CoreError> {
        let protection = self
            .years
            .find_protection(year)
            .await?
            .ok_or_else(|| CoreError::not_found("OlympicsYear", year))?;
        let now = unix_now();

        let Some(hash) = protection.password_hash else {
            return Ok(PasswordOutcome::Granted(gallery_token::mint_fresh(
                "", year, now,
            )));
        };
        let Some(secret) = protection.token_secret else {
            return Err(CoreError::Internal(format!(
                "year {year} has a password hash but no token secret"
            )));
        };

        let password = password.unwrap_or_default().to_string();
        if verify_password_blocking(password, hash).await? {
            Ok(PasswordOutcome::Granted(gallery_token::mint_fresh(
                &secret, year, now,
            )))
        } else {
            tracing::debug!(year, "Gallery password rejected");
            Ok(PasswordOutcome::Rejected)
        }
    }
}

fn token_grants(protection: &GalleryProtection, token: Option<&str>, now: i64) -> bool {
    if !protection.is_protected() {
        return true;
    }
    match (token, protection.token_secret.as_deref()) {
        (Some(token), Some(secret)) => gallery_token::verify(secret, token, protection.year, now),
        _ => false,
    }
}
