//! Event routes: create, list, view and delete.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::event::{
    CreateEventRequest, DeletedView, EventDetailView, EventView, InvitedEventView,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, EventPath};
use crate::middleware::UserAuth;

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    AppJson(request): AppJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetailView>), ApiError> {
    request.validate()?;

    let event = state.planner.create_event(user_auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/organized
pub async fn list_organized_events(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let events = state.planner.list_organized_events(user_auth.user_id).await?;
    Ok(Json(events))
}

/// GET /api/events/invited
pub async fn list_invited_events(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<InvitedEventView>>, ApiError> {
    let events = state.planner.list_invited_events(user_auth.user_id).await?;
    Ok(Json(events))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
) -> Result<Json<EventDetailView>, ApiError> {
    let event = state
        .planner
        .get_event_details(user_auth.user_id, event_id)
        .await?;
    Ok(Json(event))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
) -> Result<Json<DeletedView>, ApiError> {
    let deleted = state.planner.delete_event(user_auth.user_id, event_id).await?;
    Ok(Json(deleted))
}
