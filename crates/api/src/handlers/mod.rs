//! Request handlers.
//!
//! Handlers delegate to the [`issuetrack_db::IssueStore`] held in
//! [`crate::state::AppState`] and map errors via [`crate::error::AppError`].

pub mod issues;
pub mod users;
