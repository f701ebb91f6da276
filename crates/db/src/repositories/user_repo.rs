//! Repository for the `users` table.

use issuetrack_core::types::DbId;
use issuetrack_core::user::User;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name";

/// Provides read access and startup seeding for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// Find a user by ID within an open transaction.
    pub async fn find_by_id_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(User::from))
    }

    /// List all users ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&query).fetch_all(pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Insert `users` with their explicit IDs if the table is empty.
    ///
    /// Returns the number of rows inserted (zero when users already exist).
    /// The ID sequence is advanced past the seeded IDs so later inserts do
    /// not collide.
    pub async fn seed_if_empty(pool: &PgPool, users: &[User]) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialize concurrent seeders.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.commit().await?;
            return Ok(0);
        }

        for user in users {
            sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2)")
                .bind(user.id)
                .bind(&user.name)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('users', 'id'), \
                           COALESCE((SELECT MAX(id) FROM users), 0) + 1, false)",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(users.len())
    }
}
