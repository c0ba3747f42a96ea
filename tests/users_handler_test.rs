//! Integration tests for admin user management
//!
//! Covers:
//! - User listing with per-artist release counts
//! - Admin-created accounts with generated passwords
//! - Tariff changes taking effect immediately

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::util::ServiceExt;

use waveport::db::entities::{release::ReleaseStatus, user::Tariff};
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

#[tokio::test]
async fn test_list_users_includes_release_counts() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    create_test_release(&state.db, artist.id, "One", ReleaseStatus::Approved).await;
    create_test_release(&state.db, artist.id, "Two", ReleaseStatus::Pending).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    let listed = body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "artist@example.com")
        .expect("artist must be listed");
    assert_eq!(listed["release_count"], 2);
    // Password material never leaves the server.
    assert!(listed.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_user_returns_generated_password() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/users",
            &cookie,
            json!({"email": "new@example.com", "name": "New Artist", "tariff": "PREMIUM"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    let password = body["password"].as_str().unwrap();
    assert_eq!(password.len(), 8);
    assert_eq!(body["user"]["tariff"], "PREMIUM");

    // The generated password actually works.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "new@example.com", "password": password}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_tariff_takes_effect() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;

    let admin_cookie = session_header(&state, admin.id).await;
    let artist_cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{}/tariff", artist.id),
            &admin_cookie,
            json!({"tariff": "PREMIUM"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, artist_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body["tariff"], "PREMIUM");
}

#[tokio::test]
async fn test_create_user_duplicate_email_conflicts() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    create_test_user(&state.db, "taken@example.com", Tariff::Basic).await;

    let cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/users",
            &cookie,
            json!({"email": "taken@example.com", "name": "Copycat"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
