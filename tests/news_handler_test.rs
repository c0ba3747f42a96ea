//! Integration tests for news and notifications
//!
//! Covers:
//! - Admin publishing broadcasts a notification to every user
//! - Listing with a limit, fetching by id, deletion
//! - Mark-all-read only touches the caller's unread rows

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::util::ServiceExt;

use waveport::db::entities::user::Tariff;
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

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_publishing_news_notifies_every_user() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;

    let admin_cookie = session_header(&state, admin.id).await;
    let artist_cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/news",
            &admin_cookie,
            json!({"title": "Payout schedule change", "content": "Payouts now run weekly."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/notifications", &artist_cookie))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["kind"], "NEWS");
    assert_eq!(list[0]["is_read"], false);
}

#[tokio::test]
async fn test_list_news_respects_limit_and_order() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;

    let admin_cookie = session_header(&state, admin.id).await;
    let artist_cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    for i in 1..=3 {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/admin/news",
                &admin_cookie,
                json!({"title": format!("Post {}", i), "content": "body"}),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(get("/api/news?limit=2", &artist_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = parse_json_response(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Newest first.
    assert_eq!(list[0]["title"], "Post 3");
    assert_eq!(list[1]["title"], "Post 2");
}

#[tokio::test]
async fn test_get_and_delete_news() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let admin_cookie = session_header(&state, admin.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/news",
            &admin_cookie,
            json!({"title": "Short-lived", "content": "body"}),
        ))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    let id = body["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/news/{}", id), &admin_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/news/{}", id))
                .header(header::COOKIE, admin_cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/news/{}", id), &admin_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_all_read_scoped_to_caller() {
    let state = setup_test_app_state().await;
    let admin = create_test_admin(&state.db, "admin@example.com").await;
    let reader = create_test_user(&state.db, "reader@example.com", Tariff::Basic).await;
    let other = create_test_user(&state.db, "other@example.com", Tariff::Basic).await;

    let admin_cookie = session_header(&state, admin.id).await;
    let reader_cookie = session_header(&state, reader.id).await;
    let other_cookie = session_header(&state, other.id).await;
    let app = create_test_router(&state);

    // Broadcast reaches everyone, including the admin.
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/news",
            &admin_cookie,
            json!({"title": "Hello", "content": "body"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/notifications/read-all",
            &reader_cookie,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body["updated"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/notifications", &reader_cookie))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body.as_array().unwrap()[0]["is_read"], true);

    // The other user's notification stays unread.
    let response = app
        .oneshot(get("/api/notifications", &other_cookie))
        .await
        .unwrap();
    let body: serde_json::Value = parse_json_response(response).await;
    assert_eq!(body.as_array().unwrap()[0]["is_read"], false);
}

#[tokio::test]
async fn test_create_news_forbidden_for_artist() {
    let state = setup_test_app_state().await;
    let artist = create_test_user(&state.db, "artist@example.com", Tariff::Basic).await;
    let cookie = session_header(&state, artist.id).await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/news",
            &cookie,
            json!({"title": "Sneaky", "content": "body"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
