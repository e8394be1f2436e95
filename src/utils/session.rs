use axum_extra::extract::cookie::Cookie;
use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::config::Config;
use crate::utils::error::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Hex user id.
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

/// The authenticated caller, inserted into request extensions by the
/// session middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: ObjectId,
    pub username: String,
}

pub fn create_token(user_id: ObjectId, username: &str, config: &Config) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.session_ttl_hours))
        .ok_or_else(|| AppError::InternalError("Session expiry out of range".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_hex(),
        username: username.to_string(),
        exp: expiration as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )?)
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    Ok(decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)?)
}

pub fn session_cookie(token: String, config: &Config) -> AppResult<Cookie<'static>> {
    let mut cookie_value = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_ttl_hours * 3600
    );
    if config.cookie_secure {
        cookie_value.push_str("; Secure");
    }

    Cookie::parse(cookie_value)
        .map_err(|e| AppError::InternalError(format!("Failed to build session cookie: {e}")))
}

/// Cookie used with `CookieJar::remove` to clear the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
