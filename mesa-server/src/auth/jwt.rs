//! Staff JWT tokens
//!
//! HS256, 12 hour lifetime. Claims carry the store (tenant) so every
//! authenticated request is scoped without a database lookup.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{StaffRole, StaffUser};
use thiserror::Error;

const JWT_EXPIRY_HOURS: i64 = 12;

/// JWT claims for staff authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Staff user ID
    pub sub: i64,
    pub store_id: i64,
    pub role: StaffRole,
    /// Linked driver row (driver role only)
    pub driver_id: Option<i64>,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Create a token for `user`, returning it with its expiry in UTC millis
pub fn create_token(user: &StaffUser, secret: &str) -> Result<(String, i64), JwtError> {
    let now = chrono::Utc::now();
    let expires = now + chrono::Duration::hours(JWT_EXPIRY_HOURS);
    let claims = StaffClaims {
        sub: user.id,
        store_id: user.store_id,
        role: user.role,
        driver_id: user.driver_id,
        exp: expires.timestamp(),
        iat: now.timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Generation(e.to_string()))?;

    Ok((token, expires.timestamp_millis()))
}

/// Verify and decode a token
pub fn verify_token(token: &str, secret: &str) -> Result<StaffClaims, JwtError> {
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: StaffRole, driver_id: Option<i64>) -> StaffUser {
        StaffUser {
            id: 7,
            store_id: 42,
            name: "Ana".into(),
            email: "ana@bistro.com".into(),
            role,
            driver_id,
            is_active: true,
        }
    }

    #[test]
    fn round_trip_keeps_store_and_role() {
        let (token, expires_at) = create_token(&user(StaffRole::Driver, Some(3)), "secret").unwrap();
        assert!(expires_at > shared::util::now_millis());

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.store_id, 42);
        assert_eq!(claims.role, StaffRole::Driver);
        assert_eq!(claims.driver_id, Some(3));
        assert_eq!(claims.exp - claims.iat, JWT_EXPIRY_HOURS * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = create_token(&user(StaffRole::Admin, None), "secret").unwrap();
        assert!(matches!(
            verify_token(&token, "other"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = chrono::Utc::now().timestamp();
        let claims = StaffClaims {
            sub: 1,
            store_id: 1,
            role: StaffRole::Waiter,
            driver_id: None,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(matches!(
            verify_token(&token, "secret"),
            Err(JwtError::Expired)
        ));
    }
}
