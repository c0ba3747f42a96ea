use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{self, CurrentUser},
    db::entities::{
        user,
        user::{Tariff, TariffPeriod, UserRole},
    },
    error::{AppError, Result},
    state::AppState,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub public_id: i32,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub tariff: Tariff,
    pub tariff_period: TariffPeriod,
    pub balance: i64,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            public_id: u.public_id,
            email: u.email,
            name: u.name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            role: u.role,
            tariff: u.tariff,
            tariff_period: u.tariff_period,
            balance: u.balance,
        }
    }
}

/// Public display ids are sequential and start at 100.
pub async fn next_public_id(db: &sea_orm::DatabaseConnection) -> Result<i32> {
    let last = user::Entity::find()
        .order_by_desc(user::Column::PublicId)
        .one(db)
        .await?;
    Ok(last.map(|u| u.public_id).unwrap_or(99) + 1)
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    if !payload.email.contains('@') {
        return Err(AppError::validation("email", "must be a valid e-mail address"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("password", "must be at least 6 characters"));
    }
    let name = payload.name.unwrap_or_else(|| "Artist".to_string());
    if name.trim().len() < 2 {
        return Err(AppError::validation("name", "must be at least 2 characters"));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.clone()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&payload.password, &salt);
    let now = Utc::now();

    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        public_id: Set(next_public_id(&state.db).await?),
        email: Set(payload.email),
        name: Set(name),
        password_hash: Set(hash),
        password_salt: Set(salt),
        bio: Set(None),
        avatar_url: Set(None),
        role: Set(UserRole::Artist),
        tariff: Set(Tariff::Basic),
        tariff_period: Set(TariffPeriod::Monthly),
        balance: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.db)
    .await?;

    let cookie = auth::open_session(&state.redis, created.id).await?;
    Ok((jar.add(cookie), Json(created.into())))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.clone()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !auth::verify_password(&payload.password, &user.password_salt, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let cookie = auth::open_session(&state.redis, user.id).await?;
    Ok((jar.add(cookie), Json(user.into())))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<CookieJar> {
    auth::close_session(&state.redis, &jar).await?;
    Ok(jar.remove(Cookie::from(auth::SESSION_COOKIE)))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
