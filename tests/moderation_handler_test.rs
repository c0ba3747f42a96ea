//! Integration tests for the moderation queue and decisions
//!
//! Covers:
//! - Queue ordering (PREMIUM artists first, oldest first within a tier)
//! - Approval sets the UPC, rejection sets the reason
//! - Decided releases are terminal (second decision conflicts)
//! - Exactly one artist notification per decision

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use tower::util::ServiceExt;

use waveport::db::entities::{
    notification,
    release::{self, ReleaseStatus},
    user::Tariff,
};
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

#[tokio::test]
async fn test_pending_queue_premium_first_then_oldest() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let basic = create_test_user(&state.db, "basic@example.com", Tariff::Basic).await;
    let premium = create_test_user(&state.db, "premium@example.com", Tariff::Premium).await;

    // Interleave submission order across tiers.
    create_test_release(&state.db, basic.id, "Basic One", ReleaseStatus::Pending).await;
    create_test_release(&state.db, premium.id, "Premium One", ReleaseStatus::Pending).await;
    create_test_release(&state.db, basic.id, "Basic Two", ReleaseStatus::Pending).await;
    create_test_release(&state.db, premium.id, "Premium Two", ReleaseStatus::Pending).await;
    // Not pending, must not appear.
    create_test_release(&state.db, basic.id, "Approved", ReleaseStatus::Approved).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/releases/pending")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Premium One", "Premium Two", "Basic One", "Basic Two"]);
}

#[tokio::test]
async fn test_approve_sets_upc_and_notifies_artist() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let pending = create_test_release(&state.db, artist.id, "Night Drive", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(post_json(
            &format!("/api/admin/releases/{}/decision", pending.id),
            &cookie,
            json!({"outcome": "approve", "upc": "196000000001"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = release::Entity::find_by_id(pending.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ReleaseStatus::Approved);
    assert_eq!(updated.upc.as_deref(), Some("196000000001"));
    assert!(updated.rejection_reason.is_none());

    let notifications = notification::Entity::find()
        .filter(notification::Column::UserId.eq(artist.id))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "RELEASE_APPROVED");
}

#[tokio::test]
async fn test_reject_sets_reason_and_no_upc() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let pending = create_test_release(&state.db, artist.id, "Night Drive", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(post_json(
            &format!("/api/admin/releases/{}/decision", pending.id),
            &cookie,
            json!({"outcome": "reject", "rejection_reason": "Cover art contains third-party logos"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = release::Entity::find_by_id(pending.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ReleaseStatus::Rejected);
    assert!(updated.upc.is_none());
    assert_eq!(
        updated.rejection_reason.as_deref(),
        Some("Cover art contains third-party logos")
    );
}

#[tokio::test]
async fn test_second_decision_conflicts() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let pending = create_test_release(&state.db, artist.id, "Night Drive", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);
    let uri = format!("/api/admin/releases/{}/decision", pending.id);

    let response = app
        .clone()
        .oneshot(post_json(&uri, &cookie, json!({"outcome": "approve", "upc": "196000000001"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            &uri,
            &cookie,
            json!({"outcome": "reject", "rejection_reason": "changed my mind"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // First decision stands.
    let updated = release::Entity::find_by_id(pending.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ReleaseStatus::Approved);
    assert_eq!(updated.upc.as_deref(), Some("196000000001"));
}

#[tokio::test]
async fn test_approve_requires_upc() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let pending = create_test_release(&state.db, artist.id, "Night Drive", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(post_json(
            &format!("/api/admin/releases/{}/decision", pending.id),
            &cookie,
            json!({"outcome": "approve", "upc": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_decision_forbidden_for_artist() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let pending = create_test_release(&state.db, artist.id, "Night Drive", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(post_json(
            &format!("/api/admin/releases/{}/decision", pending.id),
            &cookie,
            json!({"outcome": "approve", "upc": "196000000001"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
