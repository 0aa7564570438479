//! Notification dispatch seam
//!
//! The delivery channels themselves (email, SMS) live outside the core.
//! Engines call the notifier after a successful commit; a dispatch
//! failure is logged by the caller and never undoes the mutation.

use bom_core::{AccountNumber, TransactionType};
use rust_decimal::Decimal;

/// A post-commit event worth telling the account holder about.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    TransactionCompleted {
        account_number: AccountNumber,
        tx_type: TransactionType,
        amount: Decimal,
    },
    FixedDepositCreated {
        account_number: AccountNumber,
        deposit_id: i64,
        principal: Decimal,
    },
    FixedDepositMatured {
        account_number: AccountNumber,
        deposit_id: i64,
        maturity_amount: Decimal,
    },
    FixedDepositClosed {
        account_number: AccountNumber,
        deposit_id: i64,
        closure_amount: Decimal,
    },
    AccountOpened {
        account_number: AccountNumber,
    },
}

/// Fire-and-forget notification dispatch.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &LedgerEvent) -> anyhow::Result<()>;
}

/// Default notifier: logs the event and nothing else.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &LedgerEvent) -> anyhow::Result<()> {
        tracing::info!(?event, "ledger notification");
        Ok(())
    }
}
