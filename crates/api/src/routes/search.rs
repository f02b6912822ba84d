//! Keyword search over the caller's events and tasks.

use axum::{extract::State, Json};
use domain::models::search::{SearchQuery, SearchResults};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppQuery;
use crate::middleware::UserAuth;

/// GET /api/search?keyword=&role=&type=
pub async fn search(
    State(state): State<AppState>,
    user_auth: UserAuth,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError> {
    let results = state.planner.search(user_auth.user_id, &query).await?;
    Ok(Json(results))
}
