//! Handlers for the read-only user directory.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::{UserListResponse, UserResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /users
// ---------------------------------------------------------------------------

/// List users that issues can be assigned to.
pub async fn list_users(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = state.store.list_users().await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}
