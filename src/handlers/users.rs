use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::{self, AdminUser},
    db::entities::{
        release,
        user,
        user::{Tariff, TariffPeriod, UserRole},
    },
    error::{AppError, Result},
    state::AppState,
};

use super::auth::{next_public_id, UserResponse};
use super::releases::ReleaseSummary;

fn default_tariff() -> Tariff {
    Tariff::Basic
}

fn default_tariff_period() -> TariffPeriod {
    TariffPeriod::Monthly
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default = "default_tariff")]
    pub tariff: Tariff,
    #[serde(default = "default_tariff_period")]
    pub tariff_period: TariffPeriod,
}

#[derive(Deserialize)]
pub struct UpdateTariffRequest {
    pub tariff: Tariff,
    pub tariff_period: Option<TariffPeriod>,
}

#[derive(Serialize)]
pub struct UserListEntry {
    #[serde(flatten)]
    pub user: UserResponse,
    pub release_count: i64,
}

#[derive(Serialize)]
pub struct UserCreatedResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Generated password, returned once so the admin can hand it over.
    pub password: String,
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub releases: Vec<ReleaseSummary>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserListEntry>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::PublicId)
        .all(&state.db)
        .await?;

    let counts: HashMap<Uuid, i64> = release::Entity::find()
        .select_only()
        .column(release::Column::ArtistId)
        .column_as(release::Column::Id.count(), "count")
        .group_by(release::Column::ArtistId)
        .into_tuple::<(Uuid, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    Ok(Json(
        users
            .into_iter()
            .map(|u| {
                let release_count = counts.get(&u.id).copied().unwrap_or(0);
                UserListEntry { user: u.into(), release_count }
            })
            .collect(),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>> {
    let found = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let releases = release::Entity::find()
        .filter(release::Column::ArtistId.eq(found.id))
        .order_by_desc(release::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(UserDetailResponse {
        user: found.into(),
        releases: releases.into_iter().map(Into::into).collect(),
    }))
}

/// Admin-invited artist account. A random password is generated, mailed to
/// the artist and returned once in the response.
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserCreatedResponse>> {
    if payload.name.trim().len() < 2 {
        return Err(AppError::validation("name", "must be at least 2 characters"));
    }
    if !payload.email.contains('@') {
        return Err(AppError::validation("email", "must be a valid e-mail address"));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.clone()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password = auth::generate_password();
    let salt = auth::generate_salt();
    let hash = auth::hash_password(&password, &salt);
    let now = Utc::now();

    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        public_id: Set(next_public_id(&state.db).await?),
        email: Set(payload.email.clone()),
        name: Set(payload.name.clone()),
        password_hash: Set(hash),
        password_salt: Set(salt),
        bio: Set(None),
        avatar_url: Set(None),
        role: Set(UserRole::Artist),
        tariff: Set(payload.tariff),
        tariff_period: Set(payload.tariff_period),
        balance: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.db)
    .await?;

    state
        .mailer
        .send_welcome(&payload.email, &payload.name, &password)
        .await;

    Ok(Json(UserCreatedResponse { user: created.into(), password }))
}

pub async fn update_tariff(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTariffRequest>,
) -> Result<Json<UserResponse>> {
    let found = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active = found.into_active_model();
    active.tariff = Set(payload.tariff);
    if let Some(period) = payload.tariff_period {
        active.tariff_period = Set(period);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}
