//! Test utilities for Waveport
//!
//! Provides helpers for creating isolated test environments with:
//! - In-memory SQLite databases (one per test)
//! - Isolated Redis connections (separate DB numbers)
//! - AppState factories
//! - Test data generators

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{NaiveDate, Utc};
use migration::MigratorTrait;
use redis::aio::ConnectionManager;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::{
    auth,
    config::Config,
    db::entities::{
        release::{self, ReleaseStatus, ReleaseType},
        track, user,
        user::{Tariff, TariffPeriod, UserRole},
    },
    services::Mailer,
    state::AppState,
};

/// Global counter for test isolation
/// Used to ensure each test gets unique resources (like Redis DB numbers)
static TEST_COUNTER: AtomicU8 = AtomicU8::new(0);

/// Get a unique test ID for this test
pub fn get_test_id() -> u8 {
    TEST_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Setup an in-memory SQLite database with all migrations applied
///
/// Each call creates a fresh, isolated database perfect for parallel testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Setup a test Redis connection using a unique database number
///
/// Redis supports 16 databases (0-15), so we use test_id % 16 to isolate tests
pub async fn setup_test_redis() -> ConnectionManager {
    let test_id = get_test_id();
    let db_number = test_id % 16;

    let redis_url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let test_redis_url = format!("{}/{}", redis_url.trim_end_matches('/'), db_number);

    let client = redis::Client::open(test_redis_url.as_str())
        .expect("Failed to create Redis client");

    let conn = client
        .get_connection_manager()
        .await
        .expect("Failed to connect to Redis");

    // Flush the test database to ensure clean state
    let mut conn_clone = conn.clone();
    redis::cmd("FLUSHDB")
        .query_async::<_, ()>(&mut conn_clone)
        .await
        .expect("Failed to flush Redis DB");

    conn
}

/// Create a test configuration with sensible defaults
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        redis_url: "redis://127.0.0.1:6379".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        upload_dir: std::env::temp_dir()
            .join("waveport-test-uploads")
            .to_string_lossy()
            .to_string(),
        songlink_api_url: "http://localhost:9".to_string(),
        smtp_host: None,
        smtp_username: None,
        smtp_password: None,
        mail_from: None,
    }
}

/// Create a complete test AppState with isolated database and Redis.
/// Mail is always disabled in tests.
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    let redis = setup_test_redis().await;
    let mut state = AppState::new(db, redis, test_config());
    state.mailer = Mailer::disabled();
    state
}

/// Open a session for the user and return a `Cookie` request-header value.
pub async fn session_header(state: &AppState, user_id: Uuid) -> String {
    let cookie = auth::open_session(&state.redis, user_id)
        .await
        .expect("Failed to open test session");
    format!("{}={}", auth::SESSION_COOKIE, cookie.value())
}

// ============================================================================
// Test Data Factories
// ============================================================================

/// Create a test artist account with a known password ("password123")
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    tariff: Tariff,
) -> user::Model {
    create_account(db, email, UserRole::Artist, tariff).await
}

/// Create a test admin account with a known password ("password123")
pub async fn create_test_admin(db: &DatabaseConnection, email: &str) -> user::Model {
    create_account(db, email, UserRole::Admin, Tariff::Basic).await
}

async fn create_account(
    db: &DatabaseConnection,
    email: &str,
    role: UserRole,
    tariff: Tariff,
) -> user::Model {
    let now = Utc::now();
    let salt = auth::generate_salt();
    let hash = auth::hash_password("password123", &salt);
    let public_id = 100 + get_test_id() as i32;

    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        public_id: Set(public_id),
        email: Set(email.to_string()),
        name: Set("Test Artist".to_string()),
        password_hash: Set(hash),
        password_salt: Set(salt),
        bio: Set(None),
        avatar_url: Set(None),
        role: Set(role),
        tariff: Set(tariff),
        tariff_period: Set(TariffPeriod::Monthly),
        balance: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    account.insert(db).await.expect("Failed to insert test user")
}

/// Create a test release in the database
pub async fn create_test_release(
    db: &DatabaseConnection,
    artist_id: Uuid,
    title: &str,
    status: ReleaseStatus,
) -> release::Model {
    let now = Utc::now();
    let release = release::ActiveModel {
        id: Set(Uuid::new_v4()),
        artist_id: Set(artist_id),
        title: Set(title.to_string()),
        version: Set(None),
        release_type: Set(ReleaseType::Single),
        genre: Set("Electronic".to_string()),
        language: Set(Some("English".to_string())),
        instrumental: Set(false),
        release_date: Set(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
        main_artist: Set("Test Artist".to_string()),
        feat_artists: Set(None),
        comment: Set(None),
        promo_request: Set(false),
        promo_release_info: Set(None),
        promo_artist_info: Set(None),
        promo_marketing_info: Set(None),
        status: Set(status),
        upc: Set(None),
        rejection_reason: Set(None),
        cover_url: Set(None),
        smart_link_slug: Set(None),
        platform_links: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    release.insert(db).await.expect("Failed to insert test release")
}

/// Create a test track in the database
pub async fn create_test_track(
    db: &DatabaseConnection,
    release_id: Uuid,
    position: i32,
    title: &str,
) -> track::Model {
    let track = track::ActiveModel {
        id: Set(Uuid::new_v4()),
        release_id: Set(release_id),
        position: Set(position),
        title: Set(title.to_string()),
        version: Set(None),
        main_artist: Set(None),
        feat_artists: Set(None),
        composer: Set("Test Composer".to_string()),
        lyricist: Set(Some("Test Lyricist".to_string())),
        instrumental: Set(false),
        ffp: Set(false),
        explicit: Set(false),
        file_url: Set(None),
        created_at: Set(Utc::now().into()),
    };

    track.insert(db).await.expect("Failed to insert test track")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_setup_test_db() {
        let db = setup_test_db().await;
        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 0);
    }

    #[tokio::test]
    async fn test_create_test_user() {
        let db = setup_test_db().await;
        let artist = create_test_user(&db, "artist@example.com", Tariff::Basic).await;

        assert_eq!(artist.email, "artist@example.com");
        assert_eq!(artist.role, UserRole::Artist);
        assert!(auth::verify_password(
            "password123",
            &artist.password_salt,
            &artist.password_hash
        ));
    }

    #[tokio::test]
    async fn test_create_test_release_with_tracks() {
        let db = setup_test_db().await;
        let artist = create_test_user(&db, "artist@example.com", Tariff::Premium).await;
        let release = create_test_release(&db, artist.id, "First Light", ReleaseStatus::Pending).await;
        let track = create_test_track(&db, release.id, 1, "Opener").await;

        assert_eq!(release.artist_id, artist.id);
        assert_eq!(track.release_id, release.id);
        assert_eq!(track.position, 1);
    }

    #[tokio::test]
    async fn test_parallel_databases() {
        let (db1, db2) = tokio::join!(setup_test_db(), setup_test_db());

        create_test_user(&db1, "one@example.com", Tariff::Basic).await;
        create_test_user(&db2, "two@example.com", Tariff::Basic).await;

        let db1_users = user::Entity::find().all(&db1).await.unwrap();
        let db2_users = user::Entity::find().all(&db2).await.unwrap();

        assert_eq!(db1_users.len(), 1);
        assert_eq!(db2_users.len(), 1);
        assert_eq!(db1_users[0].email, "one@example.com");
        assert_eq!(db2_users[0].email, "two@example.com");
    }
}
