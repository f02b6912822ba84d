//! Task board routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::task::{CreateTaskRequest, TaskView, UpdateTaskStatusRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, EventPath, TaskPath};
use crate::middleware::UserAuth;

/// POST /api/events/:id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
    AppJson(request): AppJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    request.validate()?;

    let task = state
        .planner
        .create_task(user_auth.user_id, event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/events/:id/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = state
        .planner
        .list_event_tasks(user_auth.user_id, event_id)
        .await?;
    Ok(Json(tasks))
}

/// PUT /api/events/:id/tasks/:task_id/status
pub async fn update_task_status(
    State(state): State<AppState>,
    user_auth: UserAuth,
    path: TaskPath,
    AppJson(request): AppJson<UpdateTaskStatusRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state
        .planner
        .update_task_status(user_auth.user_id, path.event_id, path.task_id, request.status)
        .await?;
    Ok(Json(task))
}
