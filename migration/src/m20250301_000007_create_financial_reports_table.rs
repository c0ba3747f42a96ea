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
                    .table(FinancialReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::Quarter)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::Title)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::FileUrl)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::LinkUrl)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(FinancialReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_reports_user_id")
                            .from(FinancialReports::Table, FinancialReports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_reports_user_id")
                    .table(FinancialReports::Table)
                    .col(FinancialReports::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum FinancialReports {
    Table,
    Id,
    UserId,
    Quarter,
    Title,
    Amount,
    FileUrl,
    LinkUrl,
    CreatedAt,
}
