//! Database operations for the guardian bot.
//!
//! # Tables
//!
//! - `admins` - The admin allow-list (`id INTEGER PRIMARY KEY AUTOINCREMENT,
//!   user_id TEXT UNIQUE NOT NULL`)
//!
//! The schema is created on startup via [`admins::AdminRepository::init`];
//! there is no separate migration step for a single table.

pub mod admins;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use admins::{Admin, AdminRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Creates the database file if it does not exist yet.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established or the URL
/// is malformed.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(database_url.expose_secret())?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
