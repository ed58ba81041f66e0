//! SQLite connection pool and migration tooling for bookshelf.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Process-scoped database handle wrapping a connection pool.
///
/// Acquired once at startup and closed at shutdown; handlers share the
/// pool through cheap clones.
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open a pool against the given SQLite URL, creating the file if needed.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Shared access to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute one module-contributed migration.
    pub async fn apply_migration(&self, module: &str, id: &str, sql: &str) -> anyhow::Result<()> {
        tracing::info!(module, id, "applying migration");

        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to apply migration '{}' from module '{}'", id, module))?;

        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Whether a driver error is a UNIQUE constraint violation.
///
/// SQLite reports constraint failures only through the error message, so
/// classification is text-based.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = error {
        db_err.message().contains("UNIQUE constraint failed")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migration_creates_table() {
        let db = Db::connect("sqlite::memory:", 1).await.unwrap();
        db.apply_migration("test", "001_init", "CREATE TABLE items (id INTEGER PRIMARY KEY);")
            .await
            .unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'items'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn duplicate_key_is_classified_as_unique_violation() {
        let db = Db::connect("sqlite::memory:", 1).await.unwrap();
        db.apply_migration("test", "001_init", "CREATE TABLE items (id TEXT PRIMARY KEY);")
            .await
            .unwrap();

        sqlx::query("INSERT INTO items (id) VALUES (?)")
            .bind("a")
            .execute(db.pool())
            .await
            .unwrap();

        let err = sqlx::query("INSERT INTO items (id) VALUES (?)")
            .bind("a")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn unrelated_errors_are_not_unique_violations() {
        let db = Db::connect("sqlite::memory:", 1).await.unwrap();

        let err = sqlx::query("SELECT * FROM missing_table")
            .fetch_all(db.pool())
            .await
            .unwrap_err();
        assert!(!is_unique_violation(&err));
    }
}
