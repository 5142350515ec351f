//! Standalone migration runner for the task store (`up`, `down`, `status`, `fresh`).
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(db_migration::Migrator).await;
}
