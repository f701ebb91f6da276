//! Repository for the `issues` table.
//!
//! Reads join `users` so every row carries its owner's name.

use issuetrack_core::issue::{Issue, IssueDraft};
use issuetrack_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::issue::IssueRow;

/// Column list for joined reads, with `i` = issues and `u` = users.
const JOINED_COLUMNS: &str = "\
    i.id, i.title, i.description, i.status, i.owner_id, \
    u.name AS owner_name, i.created_at, i.updated_at";

/// Provides persistence for issues. Rule checks happen before these calls.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a validated draft, returning the stored row with its owner.
    pub async fn insert(pool: &PgPool, draft: &IssueDraft) -> Result<IssueRow, sqlx::Error> {
        let query = format!(
            "WITH i AS ( \
                INSERT INTO issues \
                    (title, description, status, owner_id, created_at, updated_at) \
                VALUES ($1, $2, $3, $4, $5, $6) \
                RETURNING * \
             ) \
             SELECT {JOINED_COLUMNS} FROM i LEFT JOIN users u ON u.id = i.owner_id"
        );
        sqlx::query_as::<_, IssueRow>(&query)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(draft.owner_id)
            .bind(draft.created_at)
            .bind(draft.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<IssueRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM issues i \
             LEFT JOIN users u ON u.id = i.owner_id \
             WHERE i.id = $1"
        );
        sqlx::query_as::<_, IssueRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List issues, optionally restricted to one status token.
    ///
    /// Results are ordered oldest-first by ID.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<IssueRow>, sqlx::Error> {
        let where_clause = if status.is_some() {
            "WHERE i.status = $1"
        } else {
            ""
        };

        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM issues i \
             LEFT JOIN users u ON u.id = i.owner_id \
             {where_clause} \
             ORDER BY i.id"
        );

        let mut q = sqlx::query_as::<_, IssueRow>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        q.fetch_all(pool).await
    }

    /// Fetch an issue and hold its row lock until `tx` ends.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<IssueRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM issues i \
             LEFT JOIN users u ON u.id = i.owner_id \
             WHERE i.id = $1 \
             FOR UPDATE OF i"
        );
        sqlx::query_as::<_, IssueRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write every mutable field of `issue` back, returning the joined row.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        issue: &Issue,
    ) -> Result<IssueRow, sqlx::Error> {
        let query = format!(
            "WITH i AS ( \
                UPDATE issues \
                SET title = $2, description = $3, status = $4, owner_id = $5, updated_at = $6 \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {JOINED_COLUMNS} FROM i LEFT JOIN users u ON u.id = i.owner_id"
        );
        sqlx::query_as::<_, IssueRow>(&query)
            .bind(issue.id)
            .bind(&issue.title)
            .bind(&issue.description)
            .bind(issue.status.as_str())
            .bind(issue.owner_id)
            .bind(issue.updated_at)
            .fetch_one(&mut **tx)
            .await
    }
}
