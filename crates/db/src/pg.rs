//! PostgreSQL-backed [`IssueStore`].

use async_trait::async_trait;
use issuetrack_core::issue::{IssuePatch, NewIssue};
use issuetrack_core::status::IssueStatus;
use issuetrack_core::transition;
use issuetrack_core::types::{DbId, Timestamp};
use issuetrack_core::user::User;

use crate::models::issue::{IssueRow, IssueWithOwner};
use crate::repositories::{IssueRepo, UserRepo};
use crate::{DbPool, IssueStore, StoreResult};

/// Issue store over a Postgres pool.
///
/// Edits lock the issue row (`SELECT ... FOR UPDATE`) for the duration of
/// the engine decision, so concurrent patches on one issue are applied one
/// after the other.
#[derive(Debug, Clone)]
pub struct PgIssueStore {
    pool: DbPool,
}

impl PgIssueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_rows(rows: Vec<IssueRow>) -> StoreResult<Vec<IssueWithOwner>> {
    rows.into_iter().map(IssueWithOwner::try_from).collect()
}

#[async_trait]
impl IssueStore for PgIssueStore {
    async fn create_issue(&self, input: NewIssue, now: Timestamp) -> StoreResult<IssueWithOwner> {
        let owner = match input.owner_id {
            Some(id) => UserRepo::find_by_id(&self.pool, id).await?,
            None => None,
        };

        let draft = transition::create(input, &owner, now)?;
        let row = IssueRepo::insert(&self.pool, &draft).await?;
        IssueWithOwner::try_from(row)
    }

    async fn find_issue(&self, id: DbId) -> StoreResult<Option<IssueWithOwner>> {
        IssueRepo::find_by_id(&self.pool, id)
            .await?
            .map(IssueWithOwner::try_from)
            .transpose()
    }

    async fn list_issues(&self, status: Option<IssueStatus>) -> StoreResult<Vec<IssueWithOwner>> {
        let rows = IssueRepo::list_filtered(&self.pool, status.map(|s| s.as_str())).await?;
        map_rows(rows)
    }

    async fn edit_issue(
        &self,
        id: DbId,
        patch: &IssuePatch,
        now: Timestamp,
    ) -> StoreResult<IssueWithOwner> {
        let mut tx = self.pool.begin().await?;

        let row = IssueRepo::find_for_update(&mut tx, id).await?;
        let current = IssueWithOwner::try_from(transition::found(id, row)?)?;

        let owner = match patch.owner_id {
            Some(Some(owner_id)) => UserRepo::find_by_id_in(&mut tx, owner_id).await?,
            _ => None,
        };

        // A rejection drops `tx`, rolling back and releasing the row lock.
        let next = transition::apply_edit(&current.issue, patch, &owner, now)?;

        let row = IssueRepo::update(&mut tx, &next).await?;
        tx.commit().await?;

        tracing::debug!(
            issue_id = id,
            from = %current.issue.status,
            to = %next.status,
            "Issue row updated",
        );

        IssueWithOwner::try_from(row)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn seed_users(&self, users: &[User]) -> StoreResult<usize> {
        Ok(UserRepo::seed_if_empty(&self.pool, users).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
