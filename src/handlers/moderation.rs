use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    db::entities::{
        release,
        release::ReleaseStatus,
        user,
        user::Tariff,
    },
    error::{AppError, Result},
    state::AppState,
};

#[derive(Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Decision {
    Approve { upc: String },
    Reject { rejection_reason: String },
}

#[derive(Serialize)]
pub struct PendingReleaseResponse {
    pub id: Uuid,
    pub title: String,
    pub main_artist: String,
    pub release_type: release::ReleaseType,
    pub release_date: chrono::NaiveDate,
    pub cover_url: Option<String>,
    pub artist_name: String,
    pub artist_tariff: Tariff,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct DecisionResponse {
    pub id: Uuid,
    pub status: ReleaseStatus,
}

/// Moderation queue: PREMIUM artists' submissions come first, oldest first
/// within a tier.
pub async fn list_pending(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<PendingReleaseResponse>>> {
    let pending = release::Entity::find()
        .filter(release::Column::Status.eq(ReleaseStatus::Pending))
        .order_by_asc(release::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let mut responses: Vec<PendingReleaseResponse> = pending
        .into_iter()
        .filter_map(|(r, artist)| {
            artist.map(|a| PendingReleaseResponse {
                id: r.id,
                title: r.title,
                main_artist: r.main_artist,
                release_type: r.release_type,
                release_date: r.release_date,
                cover_url: r.cover_url,
                artist_name: a.name,
                artist_tariff: a.tariff,
                created_at: r.created_at.to_string(),
            })
        })
        .collect();

    // Stable: creation order is preserved within each tier.
    responses.sort_by_key(|r| r.artist_tariff != Tariff::Premium);

    Ok(Json(responses))
}

/// Apply an admin decision to a pending release.
///
/// The status change is the durable fact; the artist notification and
/// e-mail that follow are best-effort and can never undo it.
pub async fn decide(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(decision): Json<Decision>,
) -> Result<Json<DecisionResponse>> {
    let found = release::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Release not found".to_string()))?;

    let (new_status, upc, rejection_reason) = match &decision {
        Decision::Approve { upc } => {
            if upc.trim().is_empty() {
                return Err(AppError::validation("upc", "must not be empty"));
            }
            (ReleaseStatus::Approved, Some(upc.clone()), None)
        }
        Decision::Reject { rejection_reason } => {
            if rejection_reason.trim().is_empty() {
                return Err(AppError::validation("rejection_reason", "must not be empty"));
            }
            (ReleaseStatus::Rejected, None, Some(rejection_reason.clone()))
        }
    };

    // Conditional on PENDING: approved and rejected are terminal.
    let update = release::Entity::update_many()
        .col_expr(release::Column::Status, Expr::value(new_status))
        .col_expr(release::Column::Upc, Expr::value(upc.clone()))
        .col_expr(release::Column::RejectionReason, Expr::value(rejection_reason.clone()))
        .col_expr(release::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(release::Column::Id.eq(id))
        .filter(release::Column::Status.eq(ReleaseStatus::Pending))
        .exec(&state.db)
        .await?;

    if update.rows_affected == 0 {
        return Err(AppError::Conflict("Release has already been decided".to_string()));
    }

    let artist = user::Entity::find_by_id(found.artist_id).one(&state.db).await?;
    if let Some(artist) = artist {
        let approved = new_status == ReleaseStatus::Approved;
        let (kind, title, message) = if approved {
            (
                "RELEASE_APPROVED",
                "Release approved",
                format!("Your release \"{}\" has been approved!", found.title),
            )
        } else {
            (
                "RELEASE_REJECTED",
                "Release rejected",
                format!(
                    "Your release \"{}\" was rejected. Reason: {}",
                    found.title,
                    rejection_reason.as_deref().unwrap_or("-")
                ),
            )
        };

        crate::services::notifier::notify(
            &state.db,
            artist.id,
            kind,
            title,
            &message,
            Some(format!("/releases/{}", found.id)),
        )
        .await;

        state
            .mailer
            .send_release_status(
                &artist.email,
                &artist.name,
                &found.title,
                approved,
                upc.as_deref(),
                rejection_reason.as_deref(),
            )
            .await;
    }

    Ok(Json(DecisionResponse { id, status: new_status }))
}
