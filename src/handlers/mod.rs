pub mod analytics;
pub mod auth;
pub mod finance;
pub mod health;
pub mod moderation;
pub mod news;
pub mod notifications;
pub mod profile;
pub mod releases;
pub mod requests;
pub mod smartlinks;
pub mod users;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))

        // Profile
        .route("/profile", patch(profile::update_profile))
        .route("/profile/password", put(profile::change_password))

        // Releases
        .route("/releases", get(releases::list_my_releases))
        .route("/releases", post(releases::submit_release))
        .route("/releases/:id", get(releases::get_release))

        // Smart links
        .route("/releases/:id/smart-link", put(smartlinks::update_links))
        .route("/smart-links/search", get(smartlinks::search_links))

        // Finance
        .route("/finance/reports", get(finance::list_my_reports))
        .route("/finance/payouts", get(finance::list_my_payouts))
        .route("/finance/payouts", post(finance::request_payout))

        // Analytics
        .route("/analytics", get(analytics::list_my_reports))

        // Artist card requests
        .route("/requests", get(requests::list_my_requests))
        .route("/requests", post(requests::create_request))

        // News (readable by anyone with a session)
        .route("/news", get(news::list_news))
        .route("/news/:id", get(news::get_news))

        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", post(notifications::mark_all_read))

        .nest("/admin", admin_routes())
}

/// Every handler here takes an `AdminUser` extractor, so the role check is
/// enforced per-route rather than by middleware.
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Moderation
        .route("/releases/pending", get(moderation::list_pending))
        .route("/releases/:id/decision", post(moderation::decide))

        // User management
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id/tariff", put(users::update_tariff))
        .route("/users/:id/releases", get(analytics::list_artist_releases))

        // Finance
        .route("/finance/reports", get(finance::list_all_reports))
        .route("/finance/reports", post(finance::create_report))
        .route("/finance/payouts", get(finance::list_all_payouts))
        .route("/finance/payouts/pending", get(finance::list_pending_payouts))
        .route("/finance/payouts/:id/approve", post(finance::approve_payout))

        // Analytics
        .route("/analytics", post(analytics::create_report))

        // Artist card requests
        .route("/requests", get(requests::list_all_requests))
        .route("/requests/:id", patch(requests::update_request))

        // News
        .route("/news", post(news::create_news))
        .route("/news/:id", delete(news::delete_news))
}
