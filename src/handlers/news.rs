use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    db::entities::news,
    error::{AppError, Result},
    services::{notifier, storage::AssetKind},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateNewsPayload {
    pub title: String,
    pub content: String,
    /// Optional data-URI header image.
    pub image_data: Option<String>,
}

#[derive(Deserialize)]
pub struct NewsListQuery {
    pub limit: Option<u64>,
}

pub async fn create_news(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateNewsPayload>,
) -> Result<Json<news::Model>> {
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("title", "must not be empty"));
    }
    if payload.content.trim().is_empty() {
        return Err(AppError::validation("content", "must not be empty"));
    }

    let image_url = match &payload.image_data {
        Some(data) => Some(state.storage.store_data_uri(AssetKind::NewsImage, data).await?),
        None => None,
    };

    let item = news::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content.trim().to_string()),
        image_url: Set(image_url),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    notifier::broadcast(
        &state.db,
        "NEWS",
        "News",
        &item.title,
        Some(format!("/news/{}", item.id)),
    )
    .await;

    Ok(Json(item))
}

pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> Result<Json<Vec<news::Model>>> {
    let mut select = news::Entity::find().order_by_desc(news::Column::CreatedAt);
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }
    let items = select.all(&state.db).await?;
    Ok(Json(items))
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<news::Model>> {
    let item = news::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("News item not found".to_string()))?;
    Ok(Json(item))
}

pub async fn delete_news(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let result = news::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("News item not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
