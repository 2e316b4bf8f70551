//! JWT generation and verification.
//!
//! Tokens are HS256-signed JWTs containing a [`Claims`] payload. There are no
//! refresh tokens: a single token is valid until it expires.

use futurist_core::roles::Role;
use futurist_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppEnvironment;

/// Signing secret used outside production when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "futurist-cards-development-secret-do-not-use-in-production";

/// Default token lifetime in days.
const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub role: Role,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Loosely-typed payload read without verification. Every field may be absent.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct UnverifiedClaims {
    pub sub: Option<DbId>,
    pub role: Option<Role>,
    pub email: Option<String>,
}

/// Why a token was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in days (default: 30).
    pub expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var           | Required            | Default |
    /// |-------------------|---------------------|---------|
    /// | `JWT_SECRET`      | in production only  | dev key |
    /// | `JWT_EXPIRY_DAYS` | no                  | `30`    |
    ///
    /// # Panics
    ///
    /// Panics in production if `JWT_SECRET` is not set or is empty.
    pub fn from_env(environment: AppEnvironment) -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if environment.is_production() => {
                panic!("JWT_SECRET must be set in the environment in production")
            }
            _ => {
                tracing::warn!(
                    environment = %environment,
                    "JWT_SECRET not set; signing tokens with the development secret"
                );
                DEV_JWT_SECRET.to_string()
            }
        };

        let expiry_days: i64 = std::env::var("JWT_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_EXPIRY_DAYS must be a valid i64");
        assert!(expiry_days > 0, "JWT_EXPIRY_DAYS must be positive");

        Self {
            secret,
            expiry_days,
        }
    }

    /// Token lifetime in seconds, as reported in `expires_in`.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_days * 24 * 60 * 60
    }
}

/// Generate an HS256 token for the given user.
pub fn generate_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        exp: now + config.expires_in_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the embedded [`Claims`].
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

/// Read a token's payload without checking signature or expiry.
///
/// Only the development auth fallback may use this; the result is untrusted.
pub fn decode_unverified(token: &str) -> Option<UnverifiedClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}
