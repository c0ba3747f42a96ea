//! Session identity and role checks.
//!
//! Sessions are opaque random tokens stored in redis (`session:{token}` ->
//! user id) and carried in an http-only cookie. `CurrentUser` resolves the
//! token to a full user row; `AdminUser` additionally requires the ADMIN
//! role, so every privileged handler states its requirement in its
//! signature instead of repeating an inline role check.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use rand::{distributions::Alphanumeric, Rng, RngCore};
use redis::{aio::ConnectionManager, AsyncCommands};
use sea_orm::EntityTrait;
use sha2::{Digest, Sha256};

use crate::{
    db::entities::user::{self, UserRole},
    error::AppError,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "waveport_session";
const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 30;

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Create a session for the user and return the cookie to attach.
pub async fn open_session(
    redis: &ConnectionManager,
    user_id: uuid::Uuid,
) -> Result<Cookie<'static>, AppError> {
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);
    let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes);

    let mut conn = redis.clone();
    let _: () = conn
        .set_ex(session_key(&token), user_id.to_string(), SESSION_TTL_SECONDS)
        .await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    Ok(cookie)
}

/// Delete the session behind the given cookie jar, if any.
pub async fn close_session(redis: &ConnectionManager, jar: &CookieJar) -> Result<(), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let mut conn = redis.clone();
        let _: () = conn.del(session_key(cookie.value())).await?;
    }
    Ok(())
}

/// An authenticated user resolved from the session cookie.
pub struct CurrentUser(pub user::Model);

/// An authenticated user with the ADMIN role.
pub struct AdminUser(pub user::Model);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

        let mut conn = state.redis.clone();
        let user_id: Option<String> = conn.get(session_key(&token)).await?;
        let user_id = user_id
            .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?
            .parse::<uuid::Uuid>()
            .map_err(|_| AppError::Unauthorized("Invalid session".to_string()))?;

        let user = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

        Ok(CurrentUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

// -- Password hashing --------------------------------------------------------

pub fn generate_salt() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    base64::engine::general_purpose::STANDARD_NO_PAD.encode(salt)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    base64::engine::general_purpose::STANDARD_NO_PAD.encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Random 8-character password for admin-created accounts.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
