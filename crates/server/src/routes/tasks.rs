use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::task_item::{CreateTaskItem, TaskItem, UpdateTaskItem};

use crate::{DeploymentImpl, error::ApiError, middleware::load_task_middleware};

pub async fn get_tasks(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<TaskItem>>, ApiError> {
    let tasks = TaskItem::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_task(Extension(task): Extension<TaskItem>) -> ResponseJson<TaskItem> {
    ResponseJson(task)
}

pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<CreateTaskItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    tracing::debug!("Creating task '{}'", payload.title);

    let task = TaskItem::create(&deployment.db().pool, &payload).await?;
    let location = format!("/api/tasks/{}", task.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ResponseJson(task),
    ))
}

pub async fn update_task(
    Extension(existing_task): Extension<TaskItem>,
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<UpdateTaskItem>, JsonRejection>,
) -> Result<ResponseJson<TaskItem>, ApiError> {
    let Json(payload) = payload?;

    // The row can vanish between the loader and the write.
    let task = TaskItem::update(&deployment.db().pool, existing_task.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {} not found", existing_task.id)))?;

    Ok(ResponseJson(task))
}

pub async fn delete_task(
    Extension(task): Extension<TaskItem>,
    State(deployment): State<DeploymentImpl>,
) -> Result<StatusCode, ApiError> {
    let rows = TaskItem::delete(&deployment.db().pool, task.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound(format!("Task {} not found", task.id)));
    }

    tracing::info!(task_id = task.id, "Deleted task");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let task_id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .layer(from_fn_with_state(deployment.clone(), load_task_middleware::<DeploymentImpl>));

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", inner)
}
