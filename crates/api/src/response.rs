//! Response bodies for the issue endpoints.
//!
//! The JSON shape is fixed for existing clients: camelCase timestamps
//! rendered as `YYYY-MM-DD HH:MM:SS` (UTC) and
//! a nested `user` object present only when the issue has an owner.

use issuetrack_core::status::IssueStatus;
use issuetrack_core::types::{DbId, Timestamp};
use issuetrack_core::user::User;
use issuetrack_db::models::issue::IssueWithOwner;
use serde::Serialize;

/// Timestamp layout used in every response body.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp for a response body.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// Public view of an issue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl From<IssueWithOwner> for IssueResponse {
    fn from(view: IssueWithOwner) -> Self {
        let issue = view.issue;
        Self {
            id: issue.id,
            title: issue.title,
            description: issue.description,
            status: issue.status,
            created_at: format_timestamp(&issue.created_at),
            updated_at: format_timestamp(&issue.updated_at),
            user: view.owner.map(UserResponse::from),
        }
    }
}

/// `{ "issues": [...] }` envelope for list results.
#[derive(Debug, Serialize)]
pub struct IssueListResponse {
    pub issues: Vec<IssueResponse>,
}

/// `{ "users": [...] }` envelope for the user directory.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}
