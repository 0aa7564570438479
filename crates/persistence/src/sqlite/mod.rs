//! SQLite storage: connection handling, schema, repositories.

pub mod repos;
pub mod schema;

use crate::error::PersistenceResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Handle to the SQLite account store.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) a database file and ensure the schema.
    pub async fn connect(database_url: &str) -> PersistenceResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Fresh in-memory database for tests.
    ///
    /// Capped at one connection: each in-memory SQLite connection is its
    /// own database, so the pool must not open a second one.
    pub async fn in_memory() -> PersistenceResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                account_number TEXT PRIMARY KEY,
                holder_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                mobile TEXT NOT NULL UNIQUE,
                balance TEXT NOT NULL DEFAULT '0',
                status TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_number TEXT NOT NULL REFERENCES accounts(account_number),
                to_account_number TEXT REFERENCES accounts(account_number),
                amount TEXT NOT NULL,
                tx_type TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_account
            ON transactions(account_number, timestamp)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fixed_deposits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_number TEXT NOT NULL REFERENCES accounts(account_number),
                principal TEXT NOT NULL,
                maturity_amount TEXT NOT NULL,
                duration_months INTEGER NOT NULL,
                start_date TEXT NOT NULL,
                maturity_date TEXT NOT NULL,
                status TEXT NOT NULL,
                closed_date TEXT,
                description TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_fixed_deposits_maturity
            ON fixed_deposits(status, maturity_date)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_number TEXT NOT NULL REFERENCES accounts(account_number),
                action TEXT NOT NULL,
                target_account TEXT NOT NULL,
                detail TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_audit_logs_account
            ON audit_logs(account_number, timestamp)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_init() {
        let db = Database::in_memory().await.unwrap();
        // Idempotent
        db.init_schema().await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
        assert!(path.exists());
    }
}
