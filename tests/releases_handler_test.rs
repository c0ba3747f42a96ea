//! Integration tests for release submission and retrieval
//!
//! Covers:
//! - Full submission including cover upload and track ordering
//! - Server-side validation of drafts (lead time, tariff gates)
//! - All-or-nothing persistence of release + tracks
//! - Ownership checks on release detail

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::Engine;
use chrono::{Duration, Utc};
use sea_orm::EntityTrait;
use serde_json::json;
use tower::util::ServiceExt;

use waveport::db::entities::{release, track, user::Tariff};
use waveport::handlers;
use waveport::state::AppState;
use waveport::test_utils::*;

fn create_test_router(state: &AppState) -> Router {
    Router::new()
        .nest("/api", handlers::api_routes())
        .with_state(state.clone())
}

async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: axum::response::Response,
) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Minimal PNG header with the given dimensions; enough for size sniffing.
fn png_data_uri(width: u32, height: u32) -> String {
    let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn valid_draft() -> serde_json::Value {
    let release_date = (Utc::now().date_naive() + Duration::days(14)).to_string();
    json!({
        "title": "Night Drive",
        "release_type": "SINGLE",
        "genre": "Electronic",
        "language": "English",
        "release_date": release_date,
        "main_artist": "Neon Fox",
        "tracks": [
            {
                "title": "Night Drive",
                "composer": "A. Fox",
                "file_data": "https://cdn.example.com/night-drive.wav"
            },
            {
                "title": "Night Drive (Reprise)",
                "composer": "A. Fox"
            }
        ]
    })
}

#[tokio::test]
async fn test_submit_release_persists_release_and_tracks() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let mut draft = valid_draft();
    draft["cover_data"] = json!(png_data_uri(3000, 3000));

    let response = app
        .clone()
        .oneshot(post_json("/api/releases", &cookie, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body["status"], "PENDING");

    let releases = release::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].artist_id, artist.id);
    assert!(releases[0].upc.is_none());
    assert!(releases[0].cover_url.as_deref().unwrap().starts_with("/uploads/covers/"));

    // Track positions are 1..N in submission order.
    let mut tracks = track::Entity::find().all(&state.db).await.unwrap();
    tracks.sort_by_key(|t| t.position);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].position, 1);
    assert_eq!(tracks[0].title, "Night Drive");
    assert_eq!(
        tracks[0].file_url.as_deref(),
        Some("https://cdn.example.com/night-drive.wav")
    );
    assert_eq!(tracks[1].position, 2);
}

#[tokio::test]
async fn test_submit_release_rejects_wrong_cover_dimensions() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let mut draft = valid_draft();
    draft["cover_data"] = json!(png_data_uri(1400, 1400));

    let response = app
        .oneshot(post_json("/api/releases", &cookie, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing persisted.
    let releases = release::Entity::find().all(&state.db).await.unwrap();
    assert!(releases.is_empty());
    let tracks = track::Entity::find().all(&state.db).await.unwrap();
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_submit_release_rejects_short_lead_time() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let mut draft = valid_draft();
    draft["release_date"] = json!((Utc::now().date_naive() + Duration::days(3)).to_string());

    let response = app
        .oneshot(post_json("/api/releases", &cookie, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_basic_tariff_cannot_submit_ffp_track() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let mut draft = valid_draft();
    draft["tracks"][0]["ffp"] = json!(true);

    let response = app
        .oneshot(post_json("/api/releases", &cookie, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_premium_tariff_can_submit_ffp_track() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Premium).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let mut draft = valid_draft();
    draft["tracks"][0]["ffp"] = json!(true);

    let response = app
        .oneshot(post_json("/api/releases", &cookie, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_release_requires_session() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/releases")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(valid_draft().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_release_hidden_from_other_artists() {
    let state = setup_test_app_state().await;
    let owner = create_test_user(&state.db, "owner@example.com", Tariff::Basic).await;
    let other = create_test_user(&state.db, "other@example.com", Tariff::Basic).await;
    let created = create_test_release(
        &state.db,
        owner.id,
        "Hidden",
        waveport::db::entities::release::ReleaseStatus::Pending,
    )
    .await;

    let cookie = session_header(&state, other.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/releases/{}", created.id))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_my_releases_only_own() {
    let state = setup_test_app_state().await;
    let mine = create_test_user(&state.db, "mine@example.com", Tariff::Basic).await;
    let other = create_test_user(&state.db, "other@example.com", Tariff::Basic).await;
    create_test_release(
        &state.db,
        mine.id,
        "Mine",
        waveport::db::entities::release::ReleaseStatus::Approved,
    )
    .await;
    create_test_release(
        &state.db,
        other.id,
        "Theirs",
        waveport::db::entities::release::ReleaseStatus::Approved,
    )
    .await;

    let cookie = session_header(&state, mine.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/releases")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = parse_json_response(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Mine");
}
