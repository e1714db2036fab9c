pub mod pool;
pub mod schema;
pub mod url;

use crate::config::Config;
use crate::error::Result;
use sqlx::{PgPool, Postgres, Transaction};

/// A unit of work. Nothing is persisted until [`Transaction::commit`] is
/// called; dropping a session rolls it back.
pub type Session = Transaction<'static, Postgres>;

/// Owns the connection pool and hands out sessions.
///
/// Built once at startup and passed to whoever needs database access.
/// Cloning is cheap and shares the same pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = pool::create_pool(config).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Starts a new, independent session. A session must not be shared
    /// between concurrent tasks; take one per request.
    pub async fn session(&self) -> Result<Session> {
        Ok(self.pool.begin().await?)
    }

    pub async fn init_db(&self) -> Result<()> {
        schema::init_db(&self.pool).await
    }

    /// Waits for checked-out connections to come back, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
