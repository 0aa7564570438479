//! Account management commands

use anyhow::Result;
use bom_core::Account;
use bom_ledger::AccountService;
use std::path::Path;

use crate::commands::parse_account;
use crate::db;
use crate::AccountAction;

pub async fn handle(db_path: &Path, action: AccountAction) -> Result<()> {
    let database = db::connect(db_path).await?;
    let service = AccountService::new(&database);

    match action {
        AccountAction::Open { name, email, mobile } => {
            let account = service.open_account(&name, &email, &mobile).await?;
            println!("Account opened: {}", account.account_number);
            print_account(&account);
        }
        AccountAction::Show { account_number } => {
            let number = parse_account(&account_number)?;
            let account = service.get_by_number(&number).await?;
            print_account(&account);
        }
        AccountAction::List => {
            let accounts = service.list().await?;
            if accounts.is_empty() {
                println!("No accounts.");
            }
            for account in accounts {
                println!(
                    "{}  {:<24}  {:>12}  {}",
                    account.account_number, account.holder_name, account.balance, account.status
                );
            }
        }
        AccountAction::Block { account_number } => {
            let number = parse_account(&account_number)?;
            service.block_account(&number).await?;
            println!("Account {number} blocked.");
        }
        AccountAction::Unblock { account_number } => {
            let number = parse_account(&account_number)?;
            service.unblock_account(&number).await?;
            println!("Account {number} unblocked.");
        }
        AccountAction::Close { account_number } => {
            let number = parse_account(&account_number)?;
            let account = service.deactivate_account(&number).await?;
            println!("Account {} deactivated.", account.account_number);
        }
    }

    Ok(())
}

fn print_account(account: &Account) {
    println!("  Number:  {}", account.account_number);
    println!("  Holder:  {}", account.holder_name);
    println!("  Email:   {}", account.email);
    println!("  Mobile:  {}", account.mobile);
    println!("  Balance: {}", account.balance);
    println!("  Status:  {}", account.status);
    println!("  Opened:  {}", account.created_at.to_rfc3339());
}
