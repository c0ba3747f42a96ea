use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    db::entities::{
        release,
        release::{ReleaseStatus, ReleaseType},
        track,
        user::{Tariff, UserRole},
    },
    error::{AppError, Result},
    services::{notifier, AssetKind},
    state::AppState,
    tariff,
};

pub const MIN_LEAD_TIME_DAYS: i64 = 7;
const MIN_PROMO_INFO_LEN: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TrackDraft {
    pub title: String,
    pub version: Option<String>,
    pub main_artist: Option<String>,
    pub feat_artists: Option<String>,
    pub composer: String,
    pub lyricist: Option<String>,
    #[serde(default)]
    pub instrumental: bool,
    #[serde(default)]
    pub ffp: bool,
    #[serde(default)]
    pub explicit: bool,
    /// base64 data-URI, or an already-hosted http(s) URL
    pub file_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseDraft {
    pub title: String,
    pub version: Option<String>,
    pub release_type: ReleaseType,
    pub genre: String,
    #[serde(default)]
    pub instrumental: bool,
    pub language: Option<String>,
    pub release_date: NaiveDate,
    pub main_artist: String,
    pub feat_artists: Option<String>,
    pub comment: Option<String>,
    #[serde(default)]
    pub promo_request: bool,
    pub promo_release_info: Option<String>,
    pub promo_artist_info: Option<String>,
    pub promo_marketing_info: Option<String>,
    pub cover_data: Option<String>,
    pub tracks: Vec<TrackDraft>,
}

#[derive(Serialize)]
pub struct ReleaseCreatedResponse {
    pub id: Uuid,
    pub status: ReleaseStatus,
}

#[derive(Serialize)]
pub struct ReleaseSummary {
    pub id: Uuid,
    pub title: String,
    pub main_artist: String,
    pub release_type: ReleaseType,
    pub status: ReleaseStatus,
    pub release_date: NaiveDate,
    pub cover_url: Option<String>,
    pub upc: Option<String>,
    pub created_at: String,
}

impl From<release::Model> for ReleaseSummary {
    fn from(r: release::Model) -> Self {
        Self {
            id: r.id,
            title: r.title,
            main_artist: r.main_artist,
            release_type: r.release_type,
            status: r.status,
            release_date: r.release_date,
            cover_url: r.cover_url,
            upc: r.upc,
            created_at: r.created_at.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub id: Uuid,
    pub position: i32,
    pub title: String,
    pub version: Option<String>,
    pub main_artist: Option<String>,
    pub feat_artists: Option<String>,
    pub composer: String,
    pub lyricist: Option<String>,
    pub instrumental: bool,
    pub ffp: bool,
    pub explicit: bool,
    pub file_url: Option<String>,
}

impl From<track::Model> for TrackResponse {
    fn from(t: track::Model) -> Self {
        Self {
            id: t.id,
            position: t.position,
            title: t.title,
            version: t.version,
            main_artist: t.main_artist,
            feat_artists: t.feat_artists,
            composer: t.composer,
            lyricist: t.lyricist,
            instrumental: t.instrumental,
            ffp: t.ffp,
            explicit: t.explicit,
            file_url: t.file_url,
        }
    }
}

#[derive(Serialize)]
pub struct ReleaseDetailResponse {
    #[serde(flatten)]
    pub release: release::Model,
    pub tracks: Vec<TrackResponse>,
}

/// Server-side validation of a submission draft. Runs on every submission
/// regardless of what the client already enforced; the tariff gates in
/// particular must not be bypassable by a hand-crafted request.
pub fn validate_draft(draft: &ReleaseDraft, tariff_tier: Tariff, today: NaiveDate) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(AppError::validation("title", "must not be empty"));
    }
    if draft.genre.trim().is_empty() {
        return Err(AppError::validation("genre", "must not be empty"));
    }
    if draft.main_artist.trim().is_empty() {
        return Err(AppError::validation("main_artist", "must not be empty"));
    }
    if draft.tracks.is_empty() {
        return Err(AppError::validation("tracks", "at least one track is required"));
    }
    for (i, t) in draft.tracks.iter().enumerate() {
        if t.title.trim().is_empty() {
            return Err(AppError::validation(
                &format!("tracks[{}].title", i),
                "must not be empty",
            ));
        }
        if t.composer.trim().is_empty() {
            return Err(AppError::validation(
                &format!("tracks[{}].composer", i),
                "must not be empty",
            ));
        }
    }

    if draft.release_date < today + Duration::days(MIN_LEAD_TIME_DAYS) {
        return Err(AppError::validation(
            "release_date",
            &format!("must be at least {} days in the future", MIN_LEAD_TIME_DAYS),
        ));
    }

    if !draft.instrumental && draft.language.as_deref().map_or(true, |l| l.trim().is_empty()) {
        return Err(AppError::validation(
            "language",
            "required for non-instrumental releases",
        ));
    }

    if draft.promo_request {
        let info_len = draft
            .promo_release_info
            .as_deref()
            .map_or(0, |s| s.chars().count());
        if info_len < MIN_PROMO_INFO_LEN {
            return Err(AppError::validation(
                "promo_release_info",
                &format!("at least {} characters are required", MIN_PROMO_INFO_LEN),
            ));
        }
    }

    let caps = tariff::capabilities(tariff_tier);
    if draft.instrumental && !caps.can_submit_instrumental {
        return Err(AppError::validation(
            "instrumental",
            "instrumental releases require the PREMIUM tariff",
        ));
    }
    if draft.tracks.iter().any(|t| t.ffp) && !caps.can_use_ffp {
        return Err(AppError::validation(
            "tracks",
            "the FFP flag requires the PREMIUM tariff",
        ));
    }

    Ok(())
}

pub async fn submit_release(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<ReleaseDraft>,
) -> Result<Json<ReleaseCreatedResponse>> {
    validate_draft(&draft, user.tariff, Utc::now().date_naive())?;

    // Assets first. A storage failure aborts the submission; files already
    // written stay behind as orphans and are only logged.
    let cover_url = match &draft.cover_data {
        Some(data) if data.starts_with("data:") => Some(state.storage.store_cover(data).await?),
        _ => None,
    };

    let mut file_urls: Vec<Option<String>> = Vec::with_capacity(draft.tracks.len());
    for t in &draft.tracks {
        let url = match &t.file_data {
            Some(data) if data.starts_with("data:") => {
                Some(state.storage.store_data_uri(AssetKind::Audio, data).await?)
            }
            Some(link) if link.starts_with("http") => Some(link.clone()),
            _ => None,
        };
        file_urls.push(url);
    }

    // The release row and all track rows commit together or not at all.
    let now = Utc::now();
    let release_id = Uuid::new_v4();
    let txn = state.db.begin().await?;

    let new_release = release::ActiveModel {
        id: Set(release_id),
        artist_id: Set(user.id),
        title: Set(draft.title.clone()),
        version: Set(draft.version),
        release_type: Set(draft.release_type),
        genre: Set(draft.genre),
        language: Set(draft.language),
        instrumental: Set(draft.instrumental),
        release_date: Set(draft.release_date),
        main_artist: Set(draft.main_artist),
        feat_artists: Set(draft.feat_artists),
        comment: Set(draft.comment),
        promo_request: Set(draft.promo_request),
        promo_release_info: Set(draft.promo_release_info),
        promo_artist_info: Set(draft.promo_artist_info),
        promo_marketing_info: Set(draft.promo_marketing_info),
        status: Set(ReleaseStatus::Pending),
        upc: Set(None),
        rejection_reason: Set(None),
        cover_url: Set(cover_url),
        smart_link_slug: Set(None),
        platform_links: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    new_release.insert(&txn).await?;

    for (i, (t, file_url)) in draft.tracks.into_iter().zip(file_urls).enumerate() {
        track::ActiveModel {
            id: Set(Uuid::new_v4()),
            release_id: Set(release_id),
            position: Set(i as i32 + 1),
            title: Set(t.title),
            version: Set(t.version),
            main_artist: Set(t.main_artist),
            feat_artists: Set(t.feat_artists),
            composer: Set(t.composer),
            lyricist: Set(t.lyricist),
            instrumental: Set(t.instrumental),
            ffp: Set(t.ffp),
            explicit: Set(t.explicit),
            file_url: Set(file_url),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    notifier::notify_admins(
        &state.db,
        "NEW_RELEASE",
        "New release submitted",
        &format!("\"{}\" is waiting for moderation", draft.title),
        Some(format!("/admin/releases/{}", release_id)),
    )
    .await;

    Ok(Json(ReleaseCreatedResponse {
        id: release_id,
        status: ReleaseStatus::Pending,
    }))
}

pub async fn list_my_releases(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ReleaseSummary>>> {
    let releases = release::Entity::find()
        .filter(release::Column::ArtistId.eq(user.id))
        .order_by_desc(release::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(releases.into_iter().map(Into::into).collect()))
}

pub async fn get_release(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReleaseDetailResponse>> {
    let found = release::Entity::find_by_id(id).one(&state.db).await?;
    let found = match found {
        Some(r) if r.artist_id == user.id || user.role == UserRole::Admin => r,
        _ => return Err(AppError::NotFound("Release not found".to_string())),
    };

    let tracks = track::Entity::find()
        .filter(track::Column::ReleaseId.eq(found.id))
        .order_by_asc(track::Column::Position)
        .all(&state.db)
        .await?;

    Ok(Json(ReleaseDetailResponse {
        release: found,
        tracks: tracks.into_iter().map(Into::into).collect(),
    }))
}
