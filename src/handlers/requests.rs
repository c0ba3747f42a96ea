use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, CurrentUser},
    db::entities::{
        artist_request::{self, RequestStatus},
        user::{self, Tariff},
    },
    error::{AppError, Result},
    services::notifier,
    state::AppState,
    tariff,
};

#[derive(Deserialize)]
pub struct CreateRequestPayload {
    pub request_type: String,
    pub platform: Option<String>,
    pub description: String,
    /// Optional data-URI attachment (screenshot, document).
    pub attachment_data: Option<String>,
}

#[derive(Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub request_type: String,
    pub platform: Option<String>,
    pub description: String,
    pub attachment_url: Option<String>,
    pub artist_card_link: Option<String>,
    pub status: RequestStatus,
    pub created_at: String,
}

impl From<artist_request::Model> for RequestResponse {
    fn from(r: artist_request::Model) -> Self {
        Self {
            id: r.id,
            request_type: r.request_type,
            platform: r.platform,
            description: r.description,
            attachment_url: r.attachment_url,
            artist_card_link: r.artist_card_link,
            status: r.status,
            created_at: r.created_at.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct AdminRequestResponse {
    #[serde(flatten)]
    pub request: RequestResponse,
    pub artist_name: Option<String>,
    pub artist_email: Option<String>,
    pub artist_tariff: Option<Tariff>,
}

pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<Json<RequestResponse>> {
    if payload.request_type.trim().is_empty() {
        return Err(AppError::validation("request_type", "must not be empty"));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::validation("description", "must not be empty"));
    }

    let caps = tariff::capabilities(user.tariff);
    if !caps.can_manage_artist_card {
        return Err(AppError::Forbidden(
            "Artist card requests require the PREMIUM tariff".to_string(),
        ));
    }

    let attachment_url = match &payload.attachment_data {
        Some(data) => Some(
            state
                .storage
                .store_data_uri(crate::services::storage::AssetKind::Attachment, data)
                .await?,
        ),
        None => None,
    };

    let now = Utc::now();
    let request = artist_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        request_type: Set(payload.request_type.trim().to_string()),
        platform: Set(payload.platform),
        description: Set(payload.description.trim().to_string()),
        attachment_url: Set(attachment_url),
        artist_card_link: Set(None),
        status: Set(RequestStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.db)
    .await?;

    notifier::notify_admins(
        &state.db,
        "NEW_REQUEST",
        "New artist card request",
        &format!("{} filed a {} request", user.name, request.request_type),
        Some("/admin/requests".to_string()),
    )
    .await;

    Ok(Json(request.into()))
}

pub async fn list_my_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RequestResponse>>> {
    let requests = artist_request::Entity::find()
        .filter(artist_request::Column::UserId.eq(user.id))
        .order_by_desc(artist_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Admin queue: pending first, PREMIUM artists ahead of the rest, oldest
/// first within a band.
pub async fn list_all_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<AdminRequestResponse>>> {
    let rows = artist_request::Entity::find()
        .order_by_asc(artist_request::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let mut responses: Vec<AdminRequestResponse> = rows
        .into_iter()
        .map(|(request, artist)| AdminRequestResponse {
            request: request.into(),
            artist_name: artist.as_ref().map(|a| a.name.clone()),
            artist_email: artist.as_ref().map(|a| a.email.clone()),
            artist_tariff: artist.map(|a| a.tariff),
        })
        .collect();
    responses.sort_by_key(|r| {
        (
            r.request.status != RequestStatus::Pending,
            r.artist_tariff != Some(Tariff::Premium),
        )
    });

    Ok(Json(responses))
}

#[derive(Deserialize)]
pub struct UpdateRequestPayload {
    pub status: RequestStatus,
    pub artist_card_link: Option<String>,
}

pub async fn update_request(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequestPayload>,
) -> Result<Json<RequestResponse>> {
    if payload.status == RequestStatus::Pending {
        return Err(AppError::validation("status", "must be DONE or REJECTED"));
    }

    let request = artist_request::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let mut active = artist_request::ActiveModel::from(request.clone());
    active.status = Set(payload.status);
    if let Some(link) = payload.artist_card_link {
        active.artist_card_link = Set(Some(link));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.db).await?;

    let status_label = match payload.status {
        RequestStatus::Done => "completed",
        RequestStatus::Rejected => "rejected",
        RequestStatus::Pending => unreachable!(),
    };
    notifier::notify(
        &state.db,
        updated.user_id,
        "REQUEST_STATUS",
        "Request update",
        &format!("Your {} request was {}", updated.request_type, status_label),
        Some("/requests".to_string()),
    )
    .await;

    if let Some(artist) = user::Entity::find_by_id(updated.user_id).one(&state.db).await? {
        state
            .mailer
            .send_request_status(
                &artist.email,
                &artist.name,
                &updated.request_type,
                payload.status == RequestStatus::Done,
            )
            .await;
    }

    Ok(Json(updated.into()))
}
