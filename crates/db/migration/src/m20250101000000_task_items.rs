use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(TaskItems::Table)
                    .col(pk_id_col(manager, TaskItems::Id))
                    .col(ColumnDef::new(TaskItems::Title).string().not_null())
                    .col(ColumnDef::new(TaskItems::Description).text())
                    .col(ColumnDef::new(TaskItems::DueDate).date())
                    .col(
                        ColumnDef::new(TaskItems::Priority)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(TaskItems::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(TaskItems::CreatedDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_items_is_completed_due_date")
                    .table(TaskItems::Table)
                    .col(TaskItems::IsCompleted)
                    .col(TaskItems::DueDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskItems::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        // INTEGER PRIMARY KEY is the rowid alias, required for AUTOINCREMENT.
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum TaskItems {
    Table,
    Id,
    Title,
    Description,
    DueDate,
    Priority,
    IsCompleted,
    CreatedDate,
}
