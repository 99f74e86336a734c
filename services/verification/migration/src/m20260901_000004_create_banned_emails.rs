use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BannedEmails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BannedEmails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BannedEmails::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BannedEmails::BannedBy).uuid())
                    .col(ColumnDef::new(BannedEmails::Reason).string())
                    .col(
                        ColumnDef::new(BannedEmails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BannedEmails::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BannedEmails {
    Table,
    Id,
    Email,
    BannedBy,
    Reason,
    CreatedAt,
}
