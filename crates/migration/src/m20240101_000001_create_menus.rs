//! Create `menus` table.
//!
//! Timestamps default to the statement's transaction time so a fresh row has
//! `created_at == updated_at`. `version` is the optimistic-concurrency token
//! bumped by every conditional update.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        timestamp_with_time_zone(Menus::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Menus::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string(Menus::Title))
                    .col(text(Menus::Description))
                    .col(integer(Menus::NutritionValue))
                    .col(integer(Menus::Version).default(1))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Menus::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Menus { Table, Id, CreatedAt, UpdatedAt, Title, Description, NutritionValue, Version }
