pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_releases_table;
mod m20250301_000003_create_tracks_table;
mod m20250301_000004_create_notifications_table;
mod m20250301_000005_create_analytics_reports_table;
mod m20250301_000006_create_track_stats_table;
mod m20250301_000007_create_financial_reports_table;
mod m20250301_000008_create_payout_requests_table;
mod m20250301_000009_create_artist_requests_table;
mod m20250301_000010_create_news_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_releases_table::Migration),
            Box::new(m20250301_000003_create_tracks_table::Migration),
            Box::new(m20250301_000004_create_notifications_table::Migration),
            Box::new(m20250301_000005_create_analytics_reports_table::Migration),
            Box::new(m20250301_000006_create_track_stats_table::Migration),
            Box::new(m20250301_000007_create_financial_reports_table::Migration),
            Box::new(m20250301_000008_create_payout_requests_table::Migration),
            Box::new(m20250301_000009_create_artist_requests_table::Migration),
            Box::new(m20250301_000010_create_news_table::Migration),
        ]
    }
}
