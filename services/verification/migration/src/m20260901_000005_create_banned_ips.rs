use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BannedIps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BannedIps::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(BannedIps::IpAddress)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BannedIps::Reason).string())
                    .col(
                        ColumnDef::new(BannedIps::CreatedAt)
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
            .drop_table(Table::drop().table(BannedIps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BannedIps {
    Table,
    Id,
    IpAddress,
    Reason,
    CreatedAt,
}
