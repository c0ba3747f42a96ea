use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_tracks_table::Tracks;
use super::m20250301_000005_create_analytics_reports_table::AnalyticsReports;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackStats::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrackStats::ReportId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackStats::TrackId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackStats::Streams)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_stats_report_id")
                            .from(TrackStats::Table, TrackStats::ReportId)
                            .to(AnalyticsReports::Table, AnalyticsReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_stats_track_id")
                            .from(TrackStats::Table, TrackStats::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_track_stats_report_id")
                    .table(TrackStats::Table)
                    .col(TrackStats::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TrackStats {
    Table,
    Id,
    ReportId,
    TrackId,
    Streams,
}
