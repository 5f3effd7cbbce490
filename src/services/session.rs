// SPDX-License-Identifier: MIT

//! Session primitives: password hashing, JWT minting/verification,
//! refresh-token rotation hashes and auth cookies.
//!
//! Access and refresh tokens are both HS256 JWTs, signed with distinct
//! secrets. Only the SHA-256 of the current refresh token is persisted;
//! issuing a new pair overwrites it, so at most one refresh token per user
//! verifies at any time.

use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::AppError;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// bcrypt cost factor, matching the original service's ~10 rounds.
const BCRYPT_COST: u32 = 10;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// A freshly minted access/refresh pair.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ─── Passwords ───────────────────────────────────────────────────

/// Hash a password with bcrypt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))
}

// ─── Tokens ──────────────────────────────────────────────────────

/// Create a signed JWT for a user with the given lifetime.
pub fn create_token(user_id: &str, secret: &[u8], ttl_secs: i64) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + ttl_secs).max(0) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Token creation failed: {}", e)))
}

/// Verify a JWT signature and expiry; returns the claims on success.
pub fn verify_token(token: &str, secret: &[u8]) -> Option<Claims> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .ok()
}

/// Mint a new access/refresh pair for a user.
pub fn mint_token_pair(user_id: &str, config: &Config) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: create_token(
            user_id,
            &config.jwt_access_secret,
            config.access_token_ttl_secs,
        )?,
        refresh_token: create_token(
            user_id,
            &config.jwt_refresh_secret,
            config.refresh_token_ttl_secs,
        )?,
    })
}

/// SHA-256 hash of a refresh token for server-side storage.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// ─── Cookies ─────────────────────────────────────────────────────

/// httpOnly cookie carrying the access token.
pub fn access_cookie(token: &str, config: &Config) -> Cookie<'static> {
    build_cookie(ACCESS_COOKIE, token, config.access_token_ttl_secs, config)
}

/// httpOnly cookie carrying the refresh token.
pub fn refresh_cookie(token: &str, config: &Config) -> Cookie<'static> {
    build_cookie(REFRESH_COOKIE, token, config.refresh_token_ttl_secs, config)
}

/// Expired cookie clearing the access token.
pub fn clear_access_cookie(config: &Config) -> Cookie<'static> {
    build_cookie(ACCESS_COOKIE, "", 0, config)
}

/// Expired cookie clearing the refresh token.
pub fn clear_refresh_cookie(config: &Config) -> Cookie<'static> {
    build_cookie(REFRESH_COOKIE, "", 0, config)
}

/// Production issues Secure + SameSite=None (frontend lives on a different
/// subdomain); development issues SameSite=Lax over plain HTTP.
fn build_cookie(name: &str, value: &str, max_age_secs: i64, config: &Config) -> Cookie<'static> {
    let same_site = if config.is_production() {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(config.is_production())
        .same_site(same_site)
        .path("/".to_string())
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}
