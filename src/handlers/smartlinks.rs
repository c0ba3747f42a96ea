use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    db::entities::{release, user, user::UserRole},
    error::{AppError, Result},
    state::AppState,
};

const SLUG_SUFFIX_LEN: usize = 6;

#[derive(Deserialize)]
pub struct UpdateLinksRequest {
    pub links: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Serialize)]
pub struct SlugResponse {
    pub slug: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub found: bool,
    pub links: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct SmartLinkPage {
    pub title: String,
    pub version: Option<String>,
    pub main_artist: String,
    pub artist_name: String,
    pub cover_url: Option<String>,
    pub links: BTreeMap<String, String>,
}

/// Lowercased title with non-alphanumeric runs collapsed to single dashes.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

/// Save the platform-link map for a release, lazily minting the public slug
/// on first save.
pub async fn update_links(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(release_id): Path<Uuid>,
    Json(payload): Json<UpdateLinksRequest>,
) -> Result<Json<SlugResponse>> {
    let found = release::Entity::find_by_id(release_id).one(&state.db).await?;
    let found = match found {
        Some(r) if r.artist_id == user.id || user.role == UserRole::Admin => r,
        _ => return Err(AppError::NotFound("Release not found".to_string())),
    };

    let slug = match &found.smart_link_slug {
        Some(slug) => slug.clone(),
        None => format!("{}-{}", slugify(&found.title), random_suffix()),
    };

    let mut active = found.into_active_model();
    active.smart_link_slug = Set(Some(slug.clone()));
    active.platform_links = Set(Some(serde_json::to_string(&payload.links)?));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.db).await?;

    Ok(Json(SlugResponse { slug }))
}

/// Query the external lookup service for platform links. Failure and
/// no-match both come back as `found: false` so the client can fall back to
/// manual entry.
pub async fn search_links(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    if query.q.trim().is_empty() {
        return Err(AppError::validation("q", "must not be empty"));
    }

    let links = state.songlink.lookup(&query.q).await;
    Ok(Json(SearchResponse {
        found: links.is_some(),
        links: links.unwrap_or_default(),
    }))
}

/// Public smart-link resolution, no session required.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SmartLinkPage>> {
    let found = release::Entity::find()
        .filter(release::Column::SmartLinkSlug.eq(slug))
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?;

    let (release, artist) = match found {
        Some((r, Some(a))) => (r, a),
        _ => return Err(AppError::NotFound("Smart link not found".to_string())),
    };

    let links: BTreeMap<String, String> = release
        .platform_links
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    Ok(Json(SmartLinkPage {
        title: release.title,
        version: release.version,
        main_artist: release.main_artist,
        artist_name: artist.name,
        cover_url: release.cover_url,
        links,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Night Drive (Deluxe)"), "night-drive-deluxe");
        assert_eq!(slugify("  --Hello!! World--  "), "hello-world");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Ночь & Drive"), "drive");
    }

    #[test]
    fn suffix_is_lowercase_alphanumeric() {
        let s = random_suffix();
        assert_eq!(s.len(), SLUG_SUFFIX_LEN);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
