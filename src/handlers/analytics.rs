use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    auth::{AdminUser, CurrentUser},
    db::entities::{analytics_report, release, track, track_stat, user},
    error::{AppError, Result},
    services::notifier,
    state::AppState,
    tariff,
};

#[derive(Deserialize)]
pub struct TrackStatInput {
    pub track_id: Uuid,
    pub streams: i64,
}

#[derive(Deserialize)]
pub struct CreateAnalyticsRequest {
    pub artist_id: Uuid,
    pub quarter: String,
    pub total_streams: i64,
    pub unique_listeners: i64,
    pub platform_stats: BTreeMap<String, i64>,
    pub country_stats: BTreeMap<String, i64>,
    pub track_stats: Vec<TrackStatInput>,
}

#[derive(Serialize)]
pub struct TrackStatResponse {
    pub track_id: Uuid,
    pub track_title: Option<String>,
    pub streams: i64,
}

#[derive(Serialize)]
pub struct AnalyticsReportResponse {
    pub id: Uuid,
    pub quarter: String,
    pub total_streams: i64,
    pub unique_listeners: i64,
    pub platform_stats: BTreeMap<String, i64>,
    /// Withheld for BASIC-tariff artists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_stats: Option<BTreeMap<String, i64>>,
    pub track_stats: Vec<TrackStatResponse>,
    pub created_at: String,
}

pub async fn create_report(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateAnalyticsRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.quarter.trim().is_empty() {
        return Err(AppError::validation("quarter", "must not be empty"));
    }
    if payload.total_streams < 0 || payload.unique_listeners < 0 {
        return Err(AppError::validation("total_streams", "counts must not be negative"));
    }

    let artist = user::Entity::find_by_id(payload.artist_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    // Backed by a unique (artist, quarter) key; this check just gives a
    // clean error for the common case.
    let duplicate = analytics_report::Entity::find()
        .filter(analytics_report::Column::ArtistId.eq(artist.id))
        .filter(analytics_report::Column::Quarter.eq(payload.quarter.clone()))
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "A report for {} already exists for this artist",
            payload.quarter
        )));
    }

    let report_id = Uuid::new_v4();
    let txn = state.db.begin().await?;

    analytics_report::ActiveModel {
        id: Set(report_id),
        artist_id: Set(artist.id),
        quarter: Set(payload.quarter.clone()),
        total_streams: Set(payload.total_streams),
        unique_listeners: Set(payload.unique_listeners),
        platform_stats: Set(serde_json::to_string(&payload.platform_stats)?),
        country_stats: Set(serde_json::to_string(&payload.country_stats)?),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    for stat in &payload.track_stats {
        track_stat::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_id: Set(report_id),
            track_id: Set(stat.track_id),
            streams: Set(stat.streams),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    notifier::notify(
        &state.db,
        artist.id,
        "ANALYTICS_READY",
        "New analytics available",
        &format!("Your statistics for {} are ready!", payload.quarter),
        Some("/analytics".to_string()),
    )
    .await;

    state
        .mailer
        .send_analytics_ready(&artist.email, &artist.name, &payload.quarter)
        .await;

    Ok(Json(serde_json::json!({ "id": report_id })))
}

pub async fn list_my_reports(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AnalyticsReportResponse>>> {
    let caps = tariff::capabilities(user.tariff);

    let reports = analytics_report::Entity::find()
        .filter(analytics_report::Column::ArtistId.eq(user.id))
        .order_by_desc(analytics_report::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(reports.len());
    for report in reports {
        let stats = track_stat::Entity::find()
            .filter(track_stat::Column::ReportId.eq(report.id))
            .find_also_related(track::Entity)
            .all(&state.db)
            .await?;

        let country_stats = if caps.can_view_country_analytics {
            serde_json::from_str(&report.country_stats).ok()
        } else {
            None
        };

        responses.push(AnalyticsReportResponse {
            id: report.id,
            quarter: report.quarter,
            total_streams: report.total_streams,
            unique_listeners: report.unique_listeners,
            platform_stats: serde_json::from_str(&report.platform_stats).unwrap_or_default(),
            country_stats,
            track_stats: stats
                .into_iter()
                .map(|(s, t)| TrackStatResponse {
                    track_id: s.track_id,
                    track_title: t.map(|t| t.title),
                    streams: s.streams,
                })
                .collect(),
            created_at: report.created_at.to_string(),
        });
    }

    Ok(Json(responses))
}

/// Admin helper: an artist's releases with their tracks, for building the
/// per-track stats form.
pub async fn list_artist_releases(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<Vec<super::releases::ReleaseDetailResponse>>> {
    let releases = release::Entity::find()
        .filter(release::Column::ArtistId.eq(artist_id))
        .order_by_desc(release::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(releases.len());
    for r in releases {
        let tracks = track::Entity::find()
            .filter(track::Column::ReleaseId.eq(r.id))
            .order_by_asc(track::Column::Position)
            .all(&state.db)
            .await?;
        responses.push(super::releases::ReleaseDetailResponse {
            release: r,
            tracks: tracks.into_iter().map(Into::into).collect(),
        });
    }

    Ok(Json(responses))
}
