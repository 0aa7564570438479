//! End-to-end tests against an in-memory store.

use bom_core::{Account, AccountNumber, AuditAction, TransactionType};
use bom_ledger::{
    AccountService, AuditRecorder, FixedDepositConfig, FixedDepositEngine, LedgerEngine,
    LedgerError,
};
use bom_persistence::{AccountRepo, AuditLogRepo, Database, FixedDepositRepo, TransactionRepo};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn setup() -> (Database, LedgerEngine) {
    let db = Database::in_memory().await.unwrap();
    let engine = LedgerEngine::new(&db);
    (db, engine)
}

/// Insert an account with a preset balance, without going through the
/// engine, so tests can assert exact transaction and audit row counts.
async fn seed(db: &Database, raw: &str, balance: Decimal) -> AccountNumber {
    let number = AccountNumber::parse(raw).unwrap();
    let account = Account::new(
        number.clone(),
        "Test Holder",
        &format!("{}@example.com", raw.to_lowercase()),
        &format!("9{}", &raw[3..]),
    );
    AccountRepo::insert(db.pool(), &account).await.unwrap();
    if balance > Decimal::ZERO {
        AccountRepo::update_balance(db.pool(), &number, balance, Utc::now())
            .await
            .unwrap();
    }
    number
}

async fn tx_count(db: &Database, number: &AccountNumber) -> i64 {
    TransactionRepo::count_by_account(db.pool(), number)
        .await
        .unwrap()
}

async fn audit_count(db: &Database) -> i64 {
    AuditLogRepo::count(db.pool()).await.unwrap()
}

// ============================================================================
// Deposits and withdrawals
// ============================================================================

#[tokio::test]
async fn test_deposit_withdraw_round_trip() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(0)).await;

    let record = engine.deposit(&acct, dec!(500), "salary").await.unwrap();
    assert_eq!(record.amount, dec!(500));
    assert_eq!(record.tx_type, TransactionType::Deposit);
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(500.00));

    engine.withdraw(&acct, dec!(120.55), "rent").await.unwrap();
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(379.45));

    // One transaction row and one audit entry per operation
    assert_eq!(tx_count(&db, &acct).await, 2);
    assert_eq!(audit_count(&db).await, 2);

    let history = engine.transaction_history(&acct, 10, 0).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(history[0].tx_type, TransactionType::Withdrawal);
}

#[tokio::test]
async fn test_invalid_amount_leaves_no_trace() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(100)).await;

    for amount in [dec!(0), dec!(-5)] {
        let err = engine.deposit(&acct, amount, "bad").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        let err = engine.withdraw(&acct, amount, "bad").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(100.00));
    assert_eq!(tx_count(&db, &acct).await, 0);
    assert_eq!(audit_count(&db).await, 0);
}

#[tokio::test]
async fn test_withdraw_insufficient_balance() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(50)).await;

    let err = engine.withdraw(&acct, dec!(50.01), "too much").await.unwrap_err();
    assert!(err.is_insufficient_balance());

    // Exact balance is allowed
    engine.withdraw(&acct, dec!(50), "all of it").await.unwrap();
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(0.00));
    assert_eq!(tx_count(&db, &acct).await, 1);
}

#[tokio::test]
async fn test_deposit_unknown_account() {
    let (_db, engine) = setup().await;
    let ghost = AccountNumber::parse("BOM9999999").unwrap();
    let err = engine.deposit(&ghost, dec!(10), "x").await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(_)));
}

#[tokio::test]
async fn test_concurrent_withdrawals_never_overdraw() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(100)).await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        let acct = acct.clone();
        tasks.push(tokio::spawn(async move {
            engine.withdraw(&acct, dec!(30), "concurrent").await
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(err.is_insufficient_balance()),
        }
    }

    // 100 covers exactly three withdrawals of 30
    assert_eq!(succeeded, 3);
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(10.00));
    assert_eq!(tx_count(&db, &acct).await, 3);
}

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn test_transfer_conserves_total() {
    let (db, engine) = setup().await;
    let from = seed(&db, "BOM0000001", dec!(300)).await;
    let to = seed(&db, "BOM0000002", dec!(40)).await;

    let record = engine.transfer(&from, &to, dec!(125.25), "gift").await.unwrap();
    assert_eq!(record.tx_type, TransactionType::Transfer);
    assert_eq!(record.to_account_number.as_ref(), Some(&to));

    assert_eq!(engine.balance(&from).await.unwrap(), dec!(174.75));
    assert_eq!(engine.balance(&to).await.unwrap(), dec!(165.25));

    // A transfer is one transaction row, owned by the source
    assert_eq!(tx_count(&db, &from).await, 1);
    assert_eq!(tx_count(&db, &to).await, 0);
    assert_eq!(audit_count(&db).await, 1);
}

#[tokio::test]
async fn test_transfer_to_unknown_destination_touches_nothing() {
    let (db, engine) = setup().await;
    let from = seed(&db, "BOM0000001", dec!(300)).await;
    let ghost = AccountNumber::parse("BOM9999999").unwrap();

    let err = engine.transfer(&from, &ghost, dec!(50), "x").await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(_)));
    assert_eq!(engine.balance(&from).await.unwrap(), dec!(300.00));
    assert_eq!(tx_count(&db, &from).await, 0);
}

#[tokio::test]
async fn test_transfer_to_self_rejected() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(300)).await;
    let err = engine.transfer(&acct, &acct, dec!(50), "x").await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_transfer_insufficient_balance_leaves_both_untouched() {
    let (db, engine) = setup().await;
    let from = seed(&db, "BOM0000001", dec!(10)).await;
    let to = seed(&db, "BOM0000002", dec!(0)).await;

    let err = engine.transfer(&from, &to, dec!(10.01), "x").await.unwrap_err();
    assert!(err.is_insufficient_balance());
    assert_eq!(engine.balance(&from).await.unwrap(), dec!(10.00));
    assert_eq!(engine.balance(&to).await.unwrap(), dec!(0.00));
    assert_eq!(audit_count(&db).await, 0);
}

#[tokio::test]
async fn test_opposite_direction_transfers_complete() {
    let (db, engine) = setup().await;
    let a = seed(&db, "BOM0000001", dec!(500)).await;
    let b = seed(&db, "BOM0000002", dec!(500)).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        let (from, to) = if i % 2 == 0 {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        tasks.push(tokio::spawn(async move {
            engine.transfer(&from, &to, dec!(10), "ping-pong").await
        }));
    }
    for task in tasks {
        tokio::time::timeout(std::time::Duration::from_secs(10), task)
            .await
            .expect("transfer deadlocked")
            .unwrap()
            .unwrap();
    }

    // Equal traffic both ways leaves both balances where they started
    assert_eq!(engine.balance(&a).await.unwrap(), dec!(500.00));
    assert_eq!(engine.balance(&b).await.unwrap(), dec!(500.00));
}

// ============================================================================
// Fixed deposits
// ============================================================================

fn fd_engine(ledger: &LedgerEngine) -> FixedDepositEngine {
    FixedDepositEngine::new(ledger.clone(), FixedDepositConfig::default())
}

#[tokio::test]
async fn test_fd_create_debits_principal() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(5000)).await;
    let fd = fd_engine(&engine);

    let deposit = fd
        .create_fixed_deposit(&acct, dec!(1000), 12, "vacation fund")
        .await
        .unwrap();
    assert_eq!(deposit.principal, dec!(1000.00));
    assert_eq!(deposit.maturity_amount, dec!(1050.00));
    assert!(deposit.is_active());

    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(4000.00));
    assert_eq!(tx_count(&db, &acct).await, 1);
    assert_eq!(audit_count(&db).await, 1);

    let active = fd.active_fixed_deposits(&acct).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, deposit.id);
}

#[tokio::test]
async fn test_fd_create_enforces_minimums() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(5000)).await;
    let fd = fd_engine(&engine);

    let err = fd
        .create_fixed_deposit(&acct, dec!(999.99), 12, "small")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));

    let err = fd
        .create_fixed_deposit(&acct, dec!(1000), 2, "short")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));

    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(5000.00));
    assert_eq!(tx_count(&db, &acct).await, 0);
}

#[tokio::test]
async fn test_fd_create_insufficient_balance() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(800)).await;
    let fd = fd_engine(&engine);

    let err = fd
        .create_fixed_deposit(&acct, dec!(1000), 12, "too big")
        .await
        .unwrap_err();
    assert!(err.is_insufficient_balance());
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(800.00));
}

#[tokio::test]
async fn test_fd_sweep_matures_due_deposits_once() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(0)).await;
    let fd = fd_engine(&engine);

    // A deposit whose maturity date is already behind us
    let past = Utc::now() - Duration::days(2);
    FixedDepositRepo::insert(
        db.pool(),
        &acct,
        dec!(1000),
        dec!(1050.00),
        12,
        past - Duration::days(365),
        past,
        "matured long ago",
    )
    .await
    .unwrap();

    let outcome = fd.process_matured_fixed_deposits().await.unwrap();
    assert_eq!(outcome.processed, 1);
    assert!(outcome.failures.is_empty());
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(1050.00));

    // Second run finds nothing to do
    let outcome = fd.process_matured_fixed_deposits().await.unwrap();
    assert_eq!(outcome.processed, 0);
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(1050.00));

    let matured = AuditLogRepo::get_by_action(db.pool(), AuditAction::FdMatured)
        .await
        .unwrap();
    assert_eq!(matured.len(), 1);
}

#[tokio::test]
async fn test_fd_sweep_skips_undue_deposits() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(5000)).await;
    let fd = fd_engine(&engine);

    fd.create_fixed_deposit(&acct, dec!(2000), 6, "not due yet")
        .await
        .unwrap();
    let outcome = fd.process_matured_fixed_deposits().await.unwrap();
    assert_eq!(outcome.processed, 0);
    assert_eq!(fd.active_fixed_deposits(&acct).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fd_premature_closure() {
    let (db, engine) = setup().await;
    let acct = seed(&db, "BOM0000001", dec!(5000)).await;
    let fd = fd_engine(&engine);

    let deposit = fd
        .create_fixed_deposit(&acct, dec!(1000), 12, "early exit")
        .await
        .unwrap();
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(4000.00));

    let closed = fd.close_fixed_deposit(deposit.id, &acct).await.unwrap();
    assert!(closed.closed_date.is_some());
    // Half the standard rate over the contracted twelve months
    assert_eq!(engine.balance(&acct).await.unwrap(), dec!(5025.00));
    assert!(fd.active_fixed_deposits(&acct).await.unwrap().is_empty());

    // Closing again is refused
    let err = fd.close_fixed_deposit(deposit.id, &acct).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)));
}

#[tokio::test]
async fn test_fd_close_requires_owner() {
    let (db, engine) = setup().await;
    let owner = seed(&db, "BOM0000001", dec!(5000)).await;
    let other = seed(&db, "BOM0000002", dec!(0)).await;
    let fd = fd_engine(&engine);

    let deposit = fd
        .create_fixed_deposit(&owner, dec!(1000), 12, "mine")
        .await
        .unwrap();

    let err = fd.close_fixed_deposit(deposit.id, &other).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(_)));

    let err = fd.close_fixed_deposit(9999, &owner).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

// ============================================================================
// Accounts and audit
// ============================================================================

#[tokio::test]
async fn test_open_account_and_duplicate_contacts() {
    let db = Database::in_memory().await.unwrap();
    let service = AccountService::new(&db);

    let account = service
        .open_account("Priya Raman", "priya@example.com", "9876543210")
        .await
        .unwrap();
    assert_eq!(account.balance, Decimal::ZERO);
    assert!(account.is_active());

    let err = service
        .open_account("Other", "priya@example.com", "9000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));

    let err = service
        .open_account("Other", "other@example.com", "9876543210")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));

    let fetched = service.get_by_email("priya@example.com").await.unwrap();
    assert_eq!(fetched.account_number, account.account_number);
}

#[tokio::test]
async fn test_deactivate_requires_zero_balance() {
    let db = Database::in_memory().await.unwrap();
    let engine = LedgerEngine::new(&db);
    let service = AccountService::new(&db);
    let acct = seed(&db, "BOM0000001", dec!(25)).await;

    let err = service.deactivate_account(&acct).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)));

    engine.withdraw(&acct, dec!(25), "drain").await.unwrap();
    let account = service.deactivate_account(&acct).await.unwrap();
    assert!(!account.is_active());

    // Already inactive
    let err = service.deactivate_account(&acct).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)));
}

#[tokio::test]
async fn test_audit_reads_come_back_newest_first() {
    let db = Database::in_memory().await.unwrap();
    let engine = LedgerEngine::new(&db);
    let recorder = AuditRecorder::new(&db);
    let acct = seed(&db, "BOM0000001", dec!(0)).await;

    recorder
        .record(&acct, AuditAction::Login, acct.as_str(), "Login")
        .await
        .unwrap();
    engine.deposit(&acct, dec!(10), "first").await.unwrap();
    engine.withdraw(&acct, dec!(5), "second").await.unwrap();

    let entries = recorder.by_actor(&acct).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].action, AuditAction::Withdrawal);
    assert_eq!(entries[2].action, AuditAction::Login);
    assert!(entries[0].timestamp >= entries[2].timestamp);

    let deposits = recorder.by_action(AuditAction::Deposit).await.unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(recorder.count().await.unwrap(), 3);
}
