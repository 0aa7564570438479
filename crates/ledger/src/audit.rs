//! Audit Recorder
//!
//! Mutating engine operations append their audit entries inside their
//! own atomic units; this component covers the standalone appends
//! (logins, statement generation) and the read side. Entries are never
//! updated or deleted, and every read comes back newest first.

use crate::error::{LedgerError, LedgerResult};
use bom_core::{AccountNumber, AuditAction, AuditLog};
use bom_persistence::{AuditLogRepo, AuditLogRow, Database};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AuditRecorder {
    pool: SqlitePool,
}

impl AuditRecorder {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Append one entry outside any engine operation.
    pub async fn record(
        &self,
        account_number: &AccountNumber,
        action: AuditAction,
        target_account: &str,
        detail: &str,
    ) -> LedgerResult<AuditLog> {
        let now = Utc::now();
        let id =
            AuditLogRepo::insert(&self.pool, account_number, action, target_account, detail, now)
                .await?;
        Ok(AuditLog {
            id,
            account_number: account_number.clone(),
            action,
            target_account: target_account.to_string(),
            detail: detail.to_string(),
            timestamp: now,
        })
    }

    /// Entries recorded by one actor, newest first.
    pub async fn by_actor(&self, account_number: &AccountNumber) -> LedgerResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::get_by_actor(&self.pool, account_number).await?;
        convert(rows)
    }

    /// Entries for one action kind, newest first.
    pub async fn by_action(&self, action: AuditAction) -> LedgerResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::get_by_action(&self.pool, action).await?;
        convert(rows)
    }

    /// Entries whose target matches, newest first.
    pub async fn by_target(&self, target_account: &str) -> LedgerResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::get_by_target(&self.pool, target_account).await?;
        convert(rows)
    }

    /// Entries within a time range, newest first.
    pub async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<AuditLog>> {
        let rows = AuditLogRepo::get_between(&self.pool, from, to).await?;
        convert(rows)
    }

    /// Total number of entries.
    pub async fn count(&self) -> LedgerResult<i64> {
        Ok(AuditLogRepo::count(&self.pool).await?)
    }
}

fn convert(rows: Vec<AuditLogRow>) -> LedgerResult<Vec<AuditLog>> {
    rows.into_iter()
        .map(|row| AuditLog::try_from(row).map_err(LedgerError::from))
        .collect()
}
