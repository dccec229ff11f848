//! Stateless gallery access tokens.
//!
//! A token has the form `{year}.{expires_at}.{signature}` where the signature
//! is the lowercase hex HMAC-SHA256 of `{year}.{expires_at}` under the year's
//! token secret. Nothing is stored server-side; rotating the secret
//! invalidates every outstanding token for that year.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::types::Year;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lifetime of a freshly minted access token (24 hours).
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Number of random bytes in a per-year token secret.
pub const TOKEN_SECRET_BYTES: usize = 32;

/// A minted token together with its expiry, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Expiry as a Unix timestamp (seconds).
    pub expires_at: i64,
}

// ---------------------------------------------------------------------------
// Mint / verify
// ---------------------------------------------------------------------------

/// Build the token string for `year` expiring at `expires_at` (Unix seconds).
pub fn mint(secret: &str, year: Year, expires_at: i64) -> String {
    let payload = format!("{year}.{expires_at}");
    let signature = hex::encode(sign(secret, &payload));
    format!("{payload}.{signature}")
}

/// Mint a token that expires [`TOKEN_TTL_SECS`] after `now`.
pub fn mint_fresh(secret: &str, year: Year, now: i64) -> IssuedToken {
    let expires_at = now + TOKEN_TTL_SECS;
    IssuedToken {
        token: mint(secret, year, expires_at),
        expires_at,
    }
}

/// Check `token` against `secret` for `expected_year` at time `now`.
///
/// Returns `false` for anything other than a well-formed, unexpired token
/// signed for exactly this year. Never panics.
pub fn verify(secret: &str, token: &str, expected_year: Year, now: i64) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    let [year, expires_at, signature] = parts.as_slice() else {
        return false;
    };

    if *year != expected_year.to_string() {
        return false;
    }

    match expires_at.parse::<i64>() {
        Ok(exp) if exp >= now => {}
        _ => return false,
    }

    // Only canonical lowercase hex is accepted so that every distinct
    // signature string maps to distinct bytes.
    if !signature
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return false;
    }
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };

    let mut mac = new_mac(secret);
    mac.update(format!("{year}.{expires_at}").as_bytes());
    // verify_slice is constant-time and rejects length mismatches.
    mac.verify_slice(&provided).is_ok()
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Generate a fresh random per-year token secret (hex encoded).
pub fn generate_token_secret() -> String {
    let bytes: [u8; TOKEN_SECRET_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// Compare two shared secrets without leaking where they differ.
///
/// Both inputs are MAC'd under a fixed key so the comparison runs over
/// equal-length digests; `CtOutput` equality is constant-time.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    let digest = |value: &str| {
        let mut mac = new_mac("fieldday-secret-compare");
        mac.update(value.as_bytes());
        mac.finalize()
    };
    digest(expected) == digest(provided)
}

fn sign(secret: &str, payload: &str) -> Vec<u8> {
    let mut mac = new_mac(secret);
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "4f1c0d6e2b7a9e3358c1d2f0a6b4e8c7";

    #[test]
    fn token_has_three_segments() {
        let token = mint(SECRET, 2025, 1_700_000_000);
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "2025");
        assert_eq!(parts[1], "1700000000");
        assert_eq!(parts[2].len(), 64, "HMAC-SHA256 hex is 64 chars");
    }

    #[test]
    fn mint_is_deterministic() {
        assert_eq!(mint(SECRET, 2025, 100), mint(SECRET, 2025, 100));
        assert_ne!(mint(SECRET, 2025, 100), mint(SECRET, 2025, 101));
    }

    #[test]
    fn verifies_until_expiry_inclusive() {
        let token = mint(SECRET, 2025, 1_000);
        assert!(verify(SECRET, &token, 2025, 0));
        assert!(verify(SECRET, &token, 2025, 999));
        assert!(verify(SECRET, &token, 2025, 1_000));
        assert!(!verify(SECRET, &token, 2025, 1_001));
    }

    #[test]
    fn fresh_token_lasts_a_day() {
        let issued = mint_fresh(SECRET, 2024, 10_000);
        assert_eq!(issued.expires_at, 10_000 + TOKEN_TTL_SECS);
        assert!(verify(SECRET, &issued.token, 2024, 10_000 + TOKEN_TTL_SECS));
        assert!(!verify(SECRET, &issued.token, 2024, 10_001 + TOKEN_TTL_SECS));
    }

    #[test]
    fn any_signature_character_change_fails() {
        let token = mint(SECRET, 2025, 5_000);
        let sig_start = token.rfind('.').unwrap() + 1;
        for i in sig_start..token.len() {
            for replacement in [b'0', b'f', b'A', b'z'] {
                if token.as_bytes()[i] == replacement {
                    continue;
                }
                let mut bytes = token.clone().into_bytes();
                bytes[i] = replacement;
                let tampered = String::from_utf8(bytes.clone()).unwrap();
                assert!(
                    !verify(SECRET, &tampered, 2025, 0),
                    "tampered token {tampered} must fail"
                );
            }
        }
    }

    #[test]
    fn uppercase_signature_is_rejected() {
        let token = mint(SECRET, 2025, 5_000);
        assert!(!verify(SECRET, &token.to_uppercase(), 2025, 0));
    }

    #[test]
    fn other_year_fails_with_correct_secret() {
        let token = mint(SECRET, 2024, 5_000);
        assert!(!verify(SECRET, &token, 2025, 0));
    }

    #[test]
    fn other_secret_fails() {
        let token = mint(SECRET, 2025, 5_000);
        assert!(!verify("another-secret", &token, 2025, 0));
    }

    #[test]
    fn malformed_tokens_fail_closed() {
        let good = mint(SECRET, 2025, 5_000);
        let sig = good.rsplit('.').next().unwrap();
        for bad in [
            "",
            "garbage",
            "2025.5000",
            &format!("2025.5000.{sig}.extra"),
            &format!("2025.soon.{sig}"),
            &format!("02025.5000.{sig}"),
            &format!("2025.5000.{}", &sig[..62]),
            "2025.5000.zz",
        ] {
            assert!(!verify(SECRET, bad, 2025, 0), "{bad:?} must fail");
        }
    }

    #[test]
    fn generated_secrets_are_random_hex() {
        let a = generate_token_secret();
        let b = generate_token_secret();
        assert_eq!(a.len(), TOKEN_SECRET_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn secrets_match_compares_exactly() {
        assert!(secrets_match("admin-key", "admin-key"));
        assert!(!secrets_match("admin-key", "admin-kez"));
        assert!(!secrets_match("admin-key", "admin-key-longer"));
        assert!(!secrets_match("admin-key", ""));
    }
}
