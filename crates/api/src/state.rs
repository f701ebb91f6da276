use std::sync::Arc;

use issuetrack_core::clock::Clock;
use issuetrack_db::IssueStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Issue and user storage (Postgres or in-memory).
    pub store: Arc<dyn IssueStore>,
    /// Clock handed to the transition engine.
    pub clock: Arc<dyn Clock>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
