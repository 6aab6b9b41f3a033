//! SQLite-backed store access.

mod introspect;
mod listing;
mod records;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::query;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Handle to the relational store.
///
/// Explicitly injected into the engine; the crate holds no ambient global
/// store. Cloning is cheap and all access is read-only.
#[derive(Clone)]
pub struct SqliteRepositories {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }
}
