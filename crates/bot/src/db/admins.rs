//! Admin allow-list repository.
//!
//! The admin set is the bot's only durable state: one row per authorized
//! user ID. Rows are created at startup (bootstrap seed) or via the promote
//! command, and are never updated or deleted.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::RepositoryError;

/// A persisted admin identity.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Admin {
    /// Store-assigned row ID.
    pub id: i64,
    /// External chat-platform user ID.
    pub user_id: String,
}

/// Repository for admin allow-list operations.
pub struct AdminRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensure the backing table exists and seed the bootstrap admin.
    ///
    /// Idempotent across restarts: the table is created only if absent, and
    /// the bootstrap identity is inserted only if not already present.
    /// A `None` (or empty, filtered upstream) bootstrap skips seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the DDL or seed insert fails.
    pub async fn init(&self, bootstrap: Option<&str>) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT UNIQUE NOT NULL
            )
            ",
        )
        .execute(self.pool)
        .await?;

        match bootstrap {
            Some(user_id) => {
                let seeded = self.add(user_id).await?;
                if seeded {
                    info!(%user_id, "seeded bootstrap admin");
                } else {
                    debug!(%user_id, "bootstrap admin already present");
                }
            }
            None => debug!("no bootstrap admin configured"),
        }

        Ok(())
    }

    /// List all admins in natural retrieval order.
    ///
    /// The order carries no meaning; it is stable only because the query
    /// sorts by row ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Admin>, RepositoryError> {
        let rows = sqlx::query_as::<_, Admin>("SELECT id, user_id FROM admins ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Insert an admin identity if not already present.
    ///
    /// Returns `true` if a row was inserted, `false` if the identity was
    /// already an admin. Concurrent calls with the same identity are safe:
    /// the UNIQUE constraint on `user_id` is the enforcement mechanism.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("INSERT INTO admins (user_id) VALUES (?1) ON CONFLICT(user_id) DO NOTHING")
                .bind(user_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Membership test for the allow-list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM admins WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }
}
