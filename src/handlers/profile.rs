use axum::{extract::State, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::Deserialize;

use crate::{
    auth::{self, CurrentUser},
    error::{AppError, Result},
    services::AssetKind,
    state::AppState,
};

use super::auth::UserResponse;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub bio: Option<String>,
    /// base64 data-URI of the new avatar
    pub avatar_data: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    if payload.name.trim().len() < 2 {
        return Err(AppError::validation("name", "must be at least 2 characters"));
    }

    let avatar_url = match &payload.avatar_data {
        Some(data) if data.starts_with("data:") => {
            Some(state.storage.store_data_uri(AssetKind::Avatar, data).await?)
        }
        _ => user.avatar_url.clone(),
    };

    let mut active = user.into_active_model();
    active.name = Set(payload.name);
    active.bio = Set(payload.bio);
    active.avatar_url = Set(avatar_url);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>> {
    if !auth::verify_password(&payload.current_password, &user.password_salt, &user.password_hash) {
        return Err(AppError::validation("current_password", "incorrect current password"));
    }
    if payload.new_password.len() < 6 {
        return Err(AppError::validation("new_password", "must be at least 6 characters"));
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&payload.new_password, &salt);
    let email = user.email.clone();
    let name = user.name.clone();

    let mut active = user.into_active_model();
    active.password_salt = Set(salt);
    active.password_hash = Set(hash);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.db).await?;

    state.mailer.send_password_changed(&email, &name).await;

    Ok(Json(updated.into()))
}
