//! In-memory [`IssueStore`] for local runs without a database and for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use issuetrack_core::issue::{Issue, IssuePatch, NewIssue};
use issuetrack_core::status::IssueStatus;
use issuetrack_core::transition;
use issuetrack_core::types::{DbId, Timestamp};
use issuetrack_core::user::User;
use tokio::sync::RwLock;

use crate::models::issue::IssueWithOwner;
use crate::{IssueStore, StoreResult};

#[derive(Debug, Default)]
struct IssueTable {
    rows: BTreeMap<DbId, Issue>,
    last_id: DbId,
}

/// Issue store kept in process memory.
///
/// Locks are always taken issues-first, then users. Holding the issues
/// write lock across an edit makes each edit atomic.
#[derive(Debug, Default)]
pub struct MemoryIssueStore {
    issues: RwLock<IssueTable>,
    users: RwLock<BTreeMap<DbId, User>>,
}

impl MemoryIssueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            issues: RwLock::default(),
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }
}

fn attach_owner(issue: Issue, users: &BTreeMap<DbId, User>) -> IssueWithOwner {
    let owner = issue.owner_id.and_then(|id| users.get(&id).cloned());
    IssueWithOwner { issue, owner }
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn create_issue(&self, input: NewIssue, now: Timestamp) -> StoreResult<IssueWithOwner> {
        let mut issues = self.issues.write().await;
        let users = self.users.read().await;

        let draft = transition::create(input, &*users, now)?;

        issues.last_id += 1;
        let issue = draft.into_issue(issues.last_id);
        issues.rows.insert(issue.id, issue.clone());

        Ok(attach_owner(issue, &users))
    }

    async fn find_issue(&self, id: DbId) -> StoreResult<Option<IssueWithOwner>> {
        let issues = self.issues.read().await;
        let users = self.users.read().await;
        Ok(issues
            .rows
            .get(&id)
            .cloned()
            .map(|issue| attach_owner(issue, &users)))
    }

    async fn list_issues(&self, status: Option<IssueStatus>) -> StoreResult<Vec<IssueWithOwner>> {
        let issues = self.issues.read().await;
        let users = self.users.read().await;
        Ok(issues
            .rows
            .values()
            .filter(|issue| transition::matches_filter(issue, status))
            .cloned()
            .map(|issue| attach_owner(issue, &users))
            .collect())
    }

    async fn edit_issue(
        &self,
        id: DbId,
        patch: &IssuePatch,
        now: Timestamp,
    ) -> StoreResult<IssueWithOwner> {
        let mut issues = self.issues.write().await;
        let users = self.users.read().await;

        let current = transition::found(id, issues.rows.get(&id))?;
        let next = transition::apply_edit(current, patch, &*users, now)?;

        tracing::debug!(
            issue_id = id,
            from = %current.status,
            to = %next.status,
            "Issue updated in memory",
        );

        issues.rows.insert(id, next.clone());
        Ok(attach_owner(next, &users))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn seed_users(&self, users: &[User]) -> StoreResult<usize> {
        let mut existing = self.users.write().await;
        if !existing.is_empty() {
            return Ok(0);
        }
        existing.extend(users.iter().map(|u| (u.id, u.clone())));
        Ok(users.len())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
