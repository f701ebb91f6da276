//! The issue record and the inputs that create or change it.
//!
//! Records are plain data. All rule enforcement lives in
//! [`crate::transition`].

use serde::{Deserialize, Serialize};

use crate::status::IssueStatus;
use crate::types::{DbId, Timestamp};

/// Current state of one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    /// Owner by identity; the issue never owns the user's lifecycle.
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The mutable part of an issue, as decided by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub owner_id: Option<DbId>,
    pub updated_at: Timestamp,
}

impl Issue {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Copy of this issue with the mutable fields replaced.
    ///
    /// `id` and `created_at` are carried over untouched.
    pub fn revise(&self, revision: Revision) -> Issue {
        Issue {
            id: self.id,
            title: revision.title,
            description: revision.description,
            status: revision.status,
            owner_id: revision.owner_id,
            created_at: self.created_at,
            updated_at: revision.updated_at,
        }
    }
}

/// A validated issue that storage has not yet assigned an id to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl IssueDraft {
    /// Attach the storage-assigned id.
    pub fn into_issue(self, id: DbId) -> Issue {
        Issue {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<DbId>,
}

/// A partial set of changes requested against an existing issue.
///
/// Fields use `Option<Option<_>>`: the outer `None` leaves the field
/// alone, `Some(None)` is an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    /// `Some(None)` is an explicit null and is rejected by the engine.
    pub title: Option<Option<String>>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// Raw status token; parsed by the engine so that a bad or null token
    /// is a validation rejection rather than a body decoding failure.
    pub status: Option<Option<String>>,
    pub owner_id: Option<Option<DbId>>,
}
