pub mod health;
pub mod issues;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Paths are mounted at the root to stay compatible with existing clients.
///
/// ```text
/// /issue                 create, list (?status=)
/// /issue/{id}            get, patch
/// /users                 list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/issue", issues::router())
        .nest("/users", users::router())
}
