use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::{Role, User};

/// Claims embedded in the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - the user id.
    pub sub: Uuid,
    /// The user's email.
    pub email: String,
    /// The user's role at issuance time. Role-sensitive decisions re-resolve
    /// the user from storage instead of trusting this claim.
    pub role: Role,
    /// Issued-at (unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (unix timestamp, seconds).
    pub exp: i64,
}

/// Claims embedded in the refresh token. Deliberately narrow: subject only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - the user id.
    pub sub: Uuid,
    /// Issued-at (unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (unix timestamp, seconds).
    pub exp: i64,
}

/// An access/refresh token pair as returned by login and refresh.
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn sign<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Decodes and verifies a token. Signature mismatch, malformed input and
/// expiry all collapse into the same Unauthorized failure; the distinction
/// only reaches the logs.
fn check<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T> {
    decode::<T>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            AppError::Unauthorized("Invalid token, authorization denied".to_string())
        })
}

/// Issues an access/refresh token pair for a user.
///
/// The access token carries id, email and role; the refresh token carries
/// only the id and is signed with the refresh secret (which falls back to
/// the access secret when not configured separately).
pub fn issue(config: &Config, user: &User) -> Result<TokenPair> {
    let now = Utc::now();

    let access_claims = AccessClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::days(config.jwt_expire_days)).timestamp(),
    };

    let refresh_claims = RefreshClaims {
        sub: user.id,
        iat: now.timestamp(),
        exp: (now + Duration::days(config.jwt_refresh_expire_days)).timestamp(),
    };

    Ok(TokenPair {
        access: sign(&access_claims, config.jwt_secret.as_bytes())?,
        refresh: sign(&refresh_claims, config.jwt_refresh_secret.as_bytes())?,
    })
}

/// Verifies an access token and returns its claims.
pub fn verify_access(config: &Config, token: &str) -> Result<AccessClaims> {
    check(token, config.jwt_secret.as_bytes())
}

/// Verifies a refresh token and returns its claims.
pub fn verify_refresh(config: &Config, token: &str) -> Result<RefreshClaims> {
    check(token, config.jwt_refresh_secret.as_bytes())
}

/// Extracts the bearer token from an `Authorization` header value.
///
/// Returns `None` when the header is absent or the scheme is not `Bearer`.
pub fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/elearn_test".to_string(),
            port: 5000,
            jwt_secret: Zeroizing::new("a".repeat(64)),
            jwt_refresh_secret: Zeroizing::new("b".repeat(64)),
            jwt_expire_days: 30,
            jwt_refresh_expire_days: 7,
            openai_api_key: None,
            gemini_api_key: None,
            chat_request_limit: 250,
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane Student".to_string(),
            email: "student@demo.com".to_string(),
            password_hash: "argon2-hash".to_string(),
            role: Role::Student,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_access_token_round_trips() {
        let config = test_config();
        let user = test_user();

        let pair = issue(&config, &user).unwrap();
        let claims = verify_access(&config, &pair.access).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Student);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_carries_only_the_subject() {
        let config = test_config();
        let user = test_user();

        let pair = issue(&config, &user).unwrap();
        let claims = verify_refresh(&config, &pair.refresh).unwrap();
        assert_eq!(claims.sub, user.id);

        // Signed with a different secret, so it is not a valid access token.
        assert!(verify_access(&config, &pair.refresh).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now();
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            email: "student@demo.com".to_string(),
            role: Role::Student,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = sign(&claims, config.jwt_secret.as_bytes()).unwrap();

        assert!(verify_access(&config, &token).is_err());
    }

    #[test]
    fn tampered_and_malformed_tokens_fail_uniformly() {
        let config = test_config();
        let user = test_user();
        let pair = issue(&config, &user).unwrap();

        let mut other = test_config();
        other.jwt_secret = Zeroizing::new("c".repeat(64));

        let wrong_secret = verify_access(&other, &pair.access).unwrap_err();
        let garbage = verify_access(&config, "not-a-token").unwrap_err();

        // Both collapse into the same caller-visible failure.
        assert_eq!(wrong_secret.to_string(), garbage.to_string());
    }

    #[test]
    fn bearer_extraction_requires_the_scheme() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(Some("Basic abc")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(None), None);
    }
}
