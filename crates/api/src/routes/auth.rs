//! Signup and login routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{LoginRequest, LoginResponse, SignupRequest};
use domain::models::UserSummary;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    request.validate()?;

    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(response))
}
