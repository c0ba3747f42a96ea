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
                    .table(ArtistRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArtistRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::RequestType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::Platform)
                            .string_len(100),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::AttachmentUrl)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::ArtistCardLink)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArtistRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_requests_user_id")
                            .from(ArtistRequests::Table, ArtistRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_artist_requests_user_id")
                    .table(ArtistRequests::Table)
                    .col(ArtistRequests::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtistRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ArtistRequests {
    Table,
    Id,
    UserId,
    RequestType,
    Platform,
    Description,
    AttachmentUrl,
    ArtistCardLink,
    Status,
    CreatedAt,
    UpdatedAt,
}
