//! Path id extractors.
//!
//! Ids in the URL must be positive integers; anything else is a 400.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use domain::models::{EventId, TaskId};
use serde::Deserialize;

use crate::error::ApiError;

fn positive_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(format!("invalid {} id", what))),
    }
}

/// `/api/events/:id/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPath(pub EventId);

#[derive(Deserialize)]
struct EventParams {
    id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for EventPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<EventParams>::from_request_parts(parts, state).await?;
        Ok(EventPath(positive_id(&params.id, "event")?))
    }
}

/// `/api/events/:id/tasks/:task_id/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPath {
    pub event_id: EventId,
    pub task_id: TaskId,
}

#[derive(Deserialize)]
struct TaskParams {
    id: String,
    task_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for TaskPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<TaskParams>::from_request_parts(parts, state).await?;
        Ok(TaskPath {
            event_id: positive_id(&params.id, "event")?,
            task_id: positive_id(&params.task_id, "task")?,
        })
    }
}
