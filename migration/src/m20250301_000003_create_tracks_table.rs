use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_releases_table::Releases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tracks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tracks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tracks::ReleaseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tracks::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tracks::Title)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tracks::Version)
                            .string_len(200),
                    )
                    .col(
                        ColumnDef::new(Tracks::MainArtist)
                            .string_len(200),
                    )
                    .col(
                        ColumnDef::new(Tracks::FeatArtists)
                            .string_len(500),
                    )
                    .col(
                        ColumnDef::new(Tracks::Composer)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tracks::Lyricist)
                            .string_len(500),
                    )
                    .col(
                        ColumnDef::new(Tracks::Instrumental)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tracks::Ffp)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tracks::Explicit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tracks::FileUrl)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Tracks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracks_release_id")
                            .from(Tracks::Table, Tracks::ReleaseId)
                            .to(Releases::Table, Releases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracks_release_id")
                    .table(Tracks::Table)
                    .col(Tracks::ReleaseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracks_release_position")
                    .table(Tracks::Table)
                    .col(Tracks::ReleaseId)
                    .col(Tracks::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tracks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tracks {
    Table,
    Id,
    ReleaseId,
    Position,
    Title,
    Version,
    MainArtist,
    FeatArtists,
    Composer,
    Lyricist,
    Instrumental,
    Ffp,
    Explicit,
    FileUrl,
    CreatedAt,
}
