//! Storage collaborator consumed by the HTTP host.

use async_trait::async_trait;
use issuetrack_core::issue::{IssuePatch, NewIssue};
use issuetrack_core::status::IssueStatus;
use issuetrack_core::types::{DbId, Timestamp};
use issuetrack_core::user::User;

use crate::models::issue::IssueWithOwner;
use crate::StoreResult;

/// Issue and user persistence.
///
/// `create_issue` and `edit_issue` run the core transition engine and only
/// persist what it accepts. Implementations must serialize `edit_issue`
/// per issue: the read, the engine decision and the write happen as one
/// atomic step.
#[async_trait]
pub trait IssueStore: Send + Sync {
    // =========================================================================
    // Issue operations
    // =========================================================================

    /// Validate and insert a new issue.
    async fn create_issue(&self, input: NewIssue, now: Timestamp) -> StoreResult<IssueWithOwner>;

    /// Gets an issue by ID.
    async fn find_issue(&self, id: DbId) -> StoreResult<Option<IssueWithOwner>>;

    /// Lists issues ordered by ID, optionally filtered by exact status.
    async fn list_issues(&self, status: Option<IssueStatus>) -> StoreResult<Vec<IssueWithOwner>>;

    /// Apply `patch` to issue `id` atomically.
    ///
    /// A rejected patch leaves the stored issue untouched.
    async fn edit_issue(
        &self,
        id: DbId,
        patch: &IssuePatch,
        now: Timestamp,
    ) -> StoreResult<IssueWithOwner>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Lists users ordered by ID.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Insert `users` when no user exists yet. Returns how many were added.
    async fn seed_users(&self, users: &[User]) -> StoreResult<usize>;

    // =========================================================================
    // Health
    // =========================================================================

    /// Confirm the backing storage is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}
