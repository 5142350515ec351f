use std::{path::Path, sync::Arc};

use config::Config;
use db::{DBService, DbErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Shared handle passed to every request handler.
#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
}

impl LocalDeployment {
    /// Loads config from the asset directory and opens the database.
    pub async fn new() -> Result<Self, DeploymentError> {
        let asset_dir = config::asset_dir();
        if !asset_dir.exists() {
            std::fs::create_dir_all(&asset_dir)?;
        }

        let config = config::load_runtime_config(&asset_dir);
        Self::from_config(config, &asset_dir).await
    }

    /// Opens the configured database, or the default one under `asset_dir`.
    /// A failing schema migration is logged, not returned.
    pub async fn from_config(config: Config, asset_dir: &Path) -> Result<Self, DeploymentError> {
        let database_url = config.database_url_or_default(asset_dir);
        let db = DBService::connect(&database_url).await?;

        match db.migrate().await {
            Ok(()) => tracing::info!("Database schema is up to date"),
            Err(err) => tracing::error!(error = %err, "Database creation failed"),
        }

        Ok(Self::from_parts(config, db))
    }

    pub fn from_parts(config: Config, db: DBService) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use db::models::task_item::{CreateTaskItem, TaskItem};
    use sea_orm::ConnectionTrait;
    use test_support::TempDatabase;

    use super::*;

    fn config_for(temp: &TempDatabase) -> Config {
        Config {
            database_url: Some(temp.url().to_string()),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn from_config_creates_schema() {
        let temp = TempDatabase::new();

        let deployment = LocalDeployment::from_config(config_for(&temp), temp.dir())
            .await
            .unwrap();

        TaskItem::create(&deployment.db().pool, &CreateTaskItem::new("first"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn from_config_survives_a_failing_migration() {
        let temp = TempDatabase::new();
        let existing = DBService::connect(temp.url()).await.unwrap();
        existing
            .pool
            .execute_unprepared("CREATE TABLE task_items (id TEXT PRIMARY KEY)")
            .await
            .unwrap();
        assert!(existing.migrate().await.is_err());
        drop(existing);

        let deployment = LocalDeployment::from_config(config_for(&temp), temp.dir())
            .await
            .expect("migration failure is not fatal");

        assert!(TaskItem::find_all(&deployment.db().pool).await.is_err());
    }

    #[tokio::test]
    async fn from_config_fails_when_database_cannot_be_opened() {
        let temp = TempDatabase::new();
        let config = Config {
            database_url: Some(format!(
                "sqlite://{}/missing/tasks.db?mode=ro",
                temp.dir().to_string_lossy()
            )),
            ..Config::default()
        };

        assert!(matches!(
            LocalDeployment::from_config(config, temp.dir()).await,
            Err(DeploymentError::Database(_))
        ));
    }
}
