//! Integration tests for artist card requests
//!
//! Covers:
//! - PREMIUM-only access to the request workflow
//! - Admin queue ordering (pending first, PREMIUM artists first)
//! - Status updates reaching the artist as notifications

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use tower::util::ServiceExt;

use waveport::db::entities::{notification, user::Tariff};
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

fn json_request(method: &str, uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn card_request() -> serde_json::Value {
    json!({
        "request_type": "ARTIST_CARD",
        "platform": "Spotify",
        "description": "Please link my releases to my verified Spotify profile"
    })
}

#[tokio::test]
async fn test_basic_tariff_cannot_file_requests() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "basic@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(json_request("POST", "/api/requests", &cookie, card_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_premium_request_is_created_and_admins_notified() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "premium@example.com", Tariff::Premium).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/requests", &cookie, card_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["platform"], "Spotify");

    let admin_notifications = notification::Entity::find()
        .filter(notification::Column::UserId.eq(admin.id))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(admin_notifications.len(), 1);
    assert_eq!(admin_notifications[0].kind, "NEW_REQUEST");

    // The artist sees it in their own list.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/requests")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_request_notifies_artist_with_card_link() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "premium@example.com", Tariff::Premium).await;

    let artist_cookie = session_header(&state, artist.id).await;
    let admin_cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/requests", &artist_cookie, card_request()))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    let request_id = body["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/requests/{}", request_id),
            &admin_cookie,
            json!({"status": "DONE", "artist_card_link": "https://open.spotify.com/artist/x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body["status"], "DONE");
    assert_eq!(body["artist_card_link"], "https://open.spotify.com/artist/x");

    let artist_notifications = notification::Entity::find()
        .filter(notification::Column::UserId.eq(artist.id))
        .filter(notification::Column::Kind.eq("REQUEST_STATUS"))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(artist_notifications.len(), 1);
}

#[tokio::test]
async fn test_update_request_rejects_pending_status() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "premium@example.com", Tariff::Premium).await;

    let artist_cookie = session_header(&state, artist.id).await;
    let admin_cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/requests", &artist_cookie, card_request()))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    let request_id = body["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/requests/{}", request_id),
            &admin_cookie,
            json!({"status": "PENDING"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
