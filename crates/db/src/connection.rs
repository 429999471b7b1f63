use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tarifa_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Opens a pool for the configured database. Every connection gets the same
/// SQLite pragmas: referential integrity on, WAL journaling, and a busy
/// timeout derived from the configured acquire timeout so a locked catalog
/// write and a starved pool give up on the same schedule.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let timeout_secs = config.timeout_secs.max(1);
    let busy_timeout_ms = timeout_secs.saturating_mul(1000).min(30_000);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

#[cfg(test)]
mod tests {
    use tarifa_core::config::DatabaseConfig;

    use super::connect;

    #[tokio::test]
    async fn connections_carry_the_configured_pragmas() {
        let pool = connect(&DatabaseConfig::single_connection("sqlite::memory:"))
            .await
            .expect("pool");

        let foreign_keys: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");
        assert_eq!(foreign_keys, 1);

        // single_connection uses a 5 second acquire timeout.
        let busy_timeout: i64 =
            sqlx::query_scalar("PRAGMA busy_timeout").fetch_one(&pool).await.expect("pragma");
        assert_eq!(busy_timeout, 5000);

        pool.close().await;
    }
}
