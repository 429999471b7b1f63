use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// What one migration run did: how many migrations it newly applied and how
/// many the binary embeds in total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub newly_applied: usize,
    pub total: usize,
}

pub async fn run_pending(pool: &DbPool) -> Result<MigrationOutcome, MigrateError> {
    let before = applied_count(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_count(pool).await;

    Ok(MigrationOutcome {
        newly_applied: usize::try_from(after - before).unwrap_or(0),
        total: MIGRATOR.migrations.len(),
    })
}

async fn applied_count(pool: &DbPool) -> i64 {
    // The ledger table does not exist before the first run.
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;
    use tarifa_core::config::DatabaseConfig;

    use super::run_pending;
    use crate::connect;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "fiber_tier",
        "mobile_tier",
        "bundle",
        "lead",
        "idx_lead_fingerprint",
        "idx_lead_created_at",
        "idx_lead_status",
    ];

    #[tokio::test]
    async fn migrations_create_the_managed_schema() {
        let pool = connect(&DatabaseConfig::single_connection("sqlite::memory:"))
            .await
            .expect("pool");
        let outcome = run_pending(&pool).await.expect("migrations apply");
        assert_eq!(outcome.newly_applied, outcome.total);

        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'index') AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&pool)
        .await
        .expect("schema listing");

        let names: Vec<String> =
            rows.iter().map(|row| row.get::<String, _>("name")).collect();
        for object in MANAGED_SCHEMA_OBJECTS {
            assert!(names.iter().any(|name| name == object), "missing schema object {object}");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn rerunning_migrations_applies_nothing_new() {
        let pool = connect(&DatabaseConfig::single_connection("sqlite::memory:"))
            .await
            .expect("pool");

        let first = run_pending(&pool).await.expect("first run");
        assert_eq!(first.newly_applied, first.total);

        let second = run_pending(&pool).await.expect("second run");
        assert_eq!(second.newly_applied, 0);
        assert_eq!(second.total, first.total);

        pool.close().await;
    }
}
