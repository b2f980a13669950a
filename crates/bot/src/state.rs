//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::BotConfig;
use crate::line::LineClient;

/// Application state shared across all handlers.
///
/// Built once at startup and cloned into each handler; configuration is
/// immutable afterwards, so handlers never reach for ambient globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BotConfig,
    pool: SqlitePool,
    line: LineClient,
}

impl AppState {
    /// Build the state from loaded configuration and a connected pool.
    #[must_use]
    pub fn new(config: BotConfig, pool: SqlitePool) -> Self {
        let line = LineClient::new(
            config.line.channel_access_token.clone(),
            config.line.channel_secret.clone(),
            config.line.api_base.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner { config, pool, line }),
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// The database pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// The LINE platform client.
    #[must_use]
    pub fn line(&self) -> &LineClient {
        &self.inner.line
    }
}
