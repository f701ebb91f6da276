//! Issue row model and request DTOs.

use issuetrack_core::issue::{Issue, IssuePatch, NewIssue};
use issuetrack_core::serde_util::double_option;
use issuetrack_core::status::IssueStatus;
use issuetrack_core::types::{DbId, Timestamp};
use issuetrack_core::user::User;
use serde::Deserialize;
use sqlx::FromRow;

use crate::error::StoreError;

/// An issue together with its resolved owner, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueWithOwner {
    pub issue: Issue,
    pub owner: Option<User>,
}

/// A row from `issues LEFT JOIN users`.
#[derive(Debug, Clone, FromRow)]
pub struct IssueRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub owner_id: Option<DbId>,
    pub owner_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<IssueRow> for IssueWithOwner {
    type Error = StoreError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        let status: IssueStatus = row.status.parse().map_err(|_| {
            StoreError::CorruptRow(format!(
                "issue {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        let owner = match (row.owner_id, row.owner_name) {
            (Some(id), Some(name)) => Some(User { id, name }),
            (Some(id), None) => {
                return Err(StoreError::CorruptRow(format!(
                    "issue {} references missing owner {id}",
                    row.id
                )))
            }
            (None, _) => None,
        };

        Ok(IssueWithOwner {
            issue: Issue {
                id: row.id,
                title: row.title,
                description: row.description,
                status,
                owner_id: row.owner_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            owner,
        })
    }
}

/// DTO for creating a new issue.
///
/// `title` is optional here so a missing title surfaces as a validation
/// rejection from the core rather than a body decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "userId", alias = "userid")]
    pub owner_id: Option<DbId>,
}

impl From<CreateIssue> for NewIssue {
    fn from(dto: CreateIssue) -> Self {
        NewIssue {
            title: dto.title,
            description: dto.description,
            owner_id: dto.owner_id,
        }
    }
}

/// DTO for partially updating an issue.
///
/// `description` and `userId` accept an explicit `null` to clear the value.
/// A `null` title or status is kept distinct from an absent one so the
/// engine can reject it. `status` takes any JSON value: a non-string token
/// is an invalid status, not a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIssue {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<serde_json::Value>>,
    #[serde(
        rename = "userId",
        alias = "userid",
        default,
        deserialize_with = "double_option"
    )]
    pub owner_id: Option<Option<DbId>>,
}

impl From<UpdateIssue> for IssuePatch {
    fn from(dto: UpdateIssue) -> Self {
        IssuePatch {
            title: dto.title,
            description: dto.description,
            status: dto.status.map(|token| token.map(status_token)),
            owner_id: dto.owner_id,
        }
    }
}

fn status_token(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(token) => token,
        other => other.to_string(),
    }
}

/// Query parameters for listing issues.
#[derive(Debug, Default, Deserialize)]
pub struct IssueListParams {
    pub status: Option<String>,
}
