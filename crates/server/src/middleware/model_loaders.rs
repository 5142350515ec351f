use std::future::Future;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::{DBService, DbErr, models::task_item::TaskItem};

use crate::{DeploymentImpl, error::ApiError};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for DeploymentImpl {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model<M, Fut>(
    model_name: &'static str,
    model_id: i64,
    load_future: Fut,
) -> Result<M, ApiError>
where
    Fut: Future<Output = Result<Option<M>, DbErr>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(ApiError::NotFound(format!("{model_name} {model_id} not found")))
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(ApiError::Database(error))
        }
    }
}

/// Resolves `{task_id}` to a [`TaskItem`] request extension, answering 404
/// with the usual error body before the handler runs when the row does not
/// exist.
pub async fn load_task_middleware<S>(
    State(deployment): State<S>,
    Path(task_id): Path<i64>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let task = fetch_model(
        "Task",
        task_id,
        TaskItem::find_by_id(&deployment.db_service().pool, task_id),
    )
    .await?;
    request.extensions_mut().insert(task);
    Ok(next.run(request).await)
}
