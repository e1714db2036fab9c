use crate::config::Config;
use crate::database::url::{redacted, sanitize_database_url};
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

/// Pooled connections are retired after this long so the server side never
/// drops them first.
pub const RECYCLE_INTERVAL: Duration = Duration::from_secs(300);

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let database_url = sanitize_database_url(&config.database_url);
    info!(database = %redacted(&database_url), "Connecting to database");

    let pool = pool_options(config).connect(&database_url).await?;
    Ok(pool)
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .idle_timeout(RECYCLE_INTERVAL)
        .max_lifetime(RECYCLE_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_checks_liveness_and_recycles() {
        let mut config = Config::new("postgresql://u:p@h/db");
        config.max_connections = 7;
        let options = pool_options(&config);

        assert_eq!(options.get_max_connections(), 7);
        assert!(options.get_test_before_acquire());
        assert_eq!(options.get_idle_timeout(), Some(RECYCLE_INTERVAL));
        assert_eq!(options.get_max_lifetime(), Some(RECYCLE_INTERVAL));
    }

    #[tokio::test]
    async fn malformed_url_is_a_driver_error() {
        let config = Config::new("not a database url");
        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Database(_)));
    }
}
