//! Route definitions for issues.
//!
//! Mounted at `/issue` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// Issue routes.
///
/// ```text
/// POST   /           -> create_issue
/// GET    /           -> list_issues
/// GET    /{id}       -> get_issue
/// PATCH  /{id}       -> update_issue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(issues::list_issues).post(issues::create_issue))
        .route("/{id}", get(issues::get_issue).patch(issues::update_issue))
}
