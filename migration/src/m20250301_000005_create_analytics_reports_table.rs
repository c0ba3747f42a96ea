use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::ArtistId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::Quarter)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::TotalStreams)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::UniqueListeners)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::PlatformStats)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::CountryStats)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analytics_reports_artist_id")
                            .from(AnalyticsReports::Table, AnalyticsReports::ArtistId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One report per artist and quarter
        manager
            .create_index(
                Index::create()
                    .name("idx_analytics_reports_artist_quarter")
                    .table(AnalyticsReports::Table)
                    .col(AnalyticsReports::ArtistId)
                    .col(AnalyticsReports::Quarter)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AnalyticsReports {
    Table,
    Id,
    ArtistId,
    Quarter,
    TotalStreams,
    UniqueListeners,
    PlatformStats,
    CountryStats,
    CreatedAt,
}
