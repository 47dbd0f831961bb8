//! Versioned schema migrations
//!
//! Each database declares an ordered list of [`Migration`]s. The runner records
//! applied versions in a `schema_version` table and applies only the pending
//! ones, so opening an already-initialized database is a no-op.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - stores created by older builds replay only newer ones
//! 2. **Additive only** - create tables / add columns; never drop user data
//! 3. **Idempotent statements** - `CREATE TABLE IF NOT EXISTS`, so a partially
//!    recorded migration can be re-run safely
//!
//! # Example Migration
//!
//! ```rust,ignore
//! const MIGRATIONS: &[Migration] = &[Migration {
//!     version: 1,
//!     description: "Create items collection",
//!     statements: &["CREATE TABLE IF NOT EXISTS items (id TEXT PRIMARY KEY)"],
//! }];
//!
//! run_migrations(&pool, MIGRATIONS).await?;
//! ```

use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// One schema step
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Strictly increasing, starting at 1
    pub version: i32,
    pub description: &'static str,
    /// Statements executed in order inside one transaction
    pub statements: &'static [&'static str],
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded schema version
pub async fn run_migrations(pool: &SqlitePool, migrations: &[Migration]) -> Result<()> {
    validate_order(migrations)?;
    create_schema_version_table(pool).await?;

    let target_version = migrations.last().map_or(0, |m| m.version);
    let current_version = get_schema_version(pool).await?;

    if current_version == target_version {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > target_version {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, target_version
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, target_version
    );

    for migration in migrations.iter().filter(|m| m.version > current_version) {
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("✓ Migration v{} completed: {}", migration.version, migration.description);
    }

    info!("All migrations completed successfully");
    Ok(())
}

fn validate_order(migrations: &[Migration]) -> Result<()> {
    let mut previous = 0;
    for migration in migrations {
        if migration.version <= previous {
            return Err(Error::Internal(format!(
                "Migration versions must increase: v{} follows v{}",
                migration.version, previous
            )));
        }
        previous = migration.version;
    }
    Ok(())
}
