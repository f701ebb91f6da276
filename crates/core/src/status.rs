//! Issue status enumeration and its wire/database tokens.
//!
//! Statuses are stored and serialized by their textual name
//! (`PENDING`, `IN_PROGRESS`, `COMPLETED`, `CANCELLED`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Message carried by every rejected status token.
pub const MSG_INVALID_STATUS: &str = "invalid status";

// ---------------------------------------------------------------------------
// Status tokens
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// All valid status tokens, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an issue.
///
/// `Completed` and `Cancelled` are terminal: once reached, the issue
/// accepts no further edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl IssueStatus {
    /// Convert to the wire and database token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Terminal statuses freeze the record.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether an issue in this status must have an owner.
    pub fn requires_owner(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }

    /// Status a freshly created issue starts in.
    pub fn initial(has_owner: bool) -> Self {
        if has_owner {
            Self::InProgress
        } else {
            Self::Pending
        }
    }
}

impl FromStr for IssueStatus {
    type Err = CoreError;

    /// Parse an exact status token. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(MSG_INVALID_STATUS.to_string())),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an optional list filter.
///
/// `None` and the empty string both mean "no filter", mirroring how an
/// absent `?status=` query parameter is treated.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<IssueStatus>, CoreError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
