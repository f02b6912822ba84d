//! Invitation and attendance routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::attendee::{
    AttendanceUpdateView, EventAttendeesView, InvitationView, InviteUserRequest,
    UpdateAttendanceRequest,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, EventPath};
use crate::middleware::UserAuth;

/// POST /api/events/:id/invite
pub async fn invite_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
    AppJson(request): AppJson<InviteUserRequest>,
) -> Result<(StatusCode, Json<InvitationView>), ApiError> {
    request.validate()?;

    let invitation = state
        .planner
        .invite_user(user_auth.user_id, event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// PUT /api/events/:id/attendance
pub async fn update_attendance(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
    AppJson(request): AppJson<UpdateAttendanceRequest>,
) -> Result<Json<AttendanceUpdateView>, ApiError> {
    let update = state
        .planner
        .set_attendance_status(user_auth.user_id, event_id, request.status)
        .await?;
    Ok(Json(update))
}

/// GET /api/events/:id/attendees
pub async fn list_attendees(
    State(state): State<AppState>,
    user_auth: UserAuth,
    EventPath(event_id): EventPath,
) -> Result<Json<EventAttendeesView>, ApiError> {
    let roster = state
        .planner
        .list_attendees(user_auth.user_id, event_id)
        .await?;
    Ok(Json(roster))
}
