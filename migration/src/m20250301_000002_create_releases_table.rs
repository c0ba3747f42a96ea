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
                    .table(Releases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Releases::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Releases::ArtistId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::Title)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::Version)
                            .string_len(200),
                    )
                    .col(
                        ColumnDef::new(Releases::ReleaseType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::Genre)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::Language)
                            .string_len(100),
                    )
                    .col(
                        ColumnDef::new(Releases::Instrumental)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Releases::ReleaseDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::MainArtist)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::FeatArtists)
                            .string_len(500),
                    )
                    .col(
                        ColumnDef::new(Releases::Comment)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::PromoRequest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Releases::PromoReleaseInfo)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::PromoArtistInfo)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::PromoMarketingInfo)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Releases::Upc)
                            .string_len(50),
                    )
                    .col(
                        ColumnDef::new(Releases::RejectionReason)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::CoverUrl)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::SmartLinkSlug)
                            .string_len(200)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Releases::PlatformLinks)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Releases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Releases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_releases_artist_id")
                            .from(Releases::Table, Releases::ArtistId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_releases_artist_id")
                    .table(Releases::Table)
                    .col(Releases::ArtistId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_releases_status")
                    .table(Releases::Table)
                    .col(Releases::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_releases_smart_link_slug")
                    .table(Releases::Table)
                    .col(Releases::SmartLinkSlug)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Releases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Releases {
    Table,
    Id,
    ArtistId,
    Title,
    Version,
    ReleaseType,
    Genre,
    Language,
    Instrumental,
    ReleaseDate,
    MainArtist,
    FeatArtists,
    Comment,
    PromoRequest,
    PromoReleaseInfo,
    PromoArtistInfo,
    PromoMarketingInfo,
    Status,
    Upc,
    RejectionReason,
    CoverUrl,
    SmartLinkSlug,
    PlatformLinks,
    CreatedAt,
    UpdatedAt,
}
