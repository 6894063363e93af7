use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

const STATUS_VALUES: [&str; 3] = ["new", "in progress", "done"];
const DEFAULT_STATUS: &str = "new";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(text(Tasks::Description))
                    .col(string_len(Tasks::Status, 20).default(DEFAULT_STATUS))
                    .col(timestamp(Tasks::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Tasks::UpdatedAt).default(Expr::current_timestamp()))
                    .check(Expr::col(Tasks::Status).is_in(STATUS_VALUES))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).if_exists().to_owned())
            .await
    }
}
