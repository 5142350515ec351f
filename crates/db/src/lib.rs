use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub use sea_orm::DbErr;

pub mod entities;
pub mod models;
pub mod types;

pub type DbPool = DatabaseConnection;

const MAX_CONNECTIONS: u32 = 8;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Opens the pool and brings the schema up to date.
    pub async fn new(database_url: &str) -> Result<DBService, DbErr> {
        let service = Self::connect(database_url).await?;
        service.migrate().await?;
        Ok(service)
    }

    /// Opens the pool without touching the schema. The SQLite file is created
    /// when the URL carries `mode=rwc`.
    pub async fn connect(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .max_connections(MAX_CONNECTIONS)
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);

        let pool = Database::connect(options).await?;
        if !database_url.contains(":memory:") {
            pool.execute_unprepared("PRAGMA journal_mode = WAL;").await?;
        }
        tracing::debug!("Connected to {}", redact_url(database_url));
        Ok(DBService { pool })
    }

    pub async fn migrate(&self) -> Result<(), DbErr> {
        db_migration::Migrator::up(&self.pool, None).await
    }
}

fn redact_url(database_url: &str) -> &str {
    database_url.split('?').next().unwrap_or(database_url)
}
