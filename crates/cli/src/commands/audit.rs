//! Audit trail commands

use anyhow::{bail, Context, Result};
use bom_core::AuditLog;
use bom_ledger::AuditRecorder;
use std::path::Path;

use crate::commands::parse_account;
use crate::db;
use crate::AuditAction;

pub async fn handle(db_path: &Path, action: AuditAction) -> Result<()> {
    let database = db::connect(db_path).await?;
    let recorder = AuditRecorder::new(&database);

    match action {
        AuditAction::List {
            actor,
            action,
            target,
        } => {
            let filters = [actor.is_some(), action.is_some(), target.is_some()]
                .iter()
                .filter(|set| **set)
                .count();
            if filters > 1 {
                bail!("use at most one of --actor, --action, --target");
            }

            let entries = if let Some(actor) = actor {
                let number = parse_account(&actor)?;
                recorder.by_actor(&number).await?
            } else if let Some(action) = action {
                let kind = bom_core::AuditAction::parse(&action)
                    .with_context(|| format!("unknown action kind {action:?}"))?;
                recorder.by_action(kind).await?
            } else if let Some(target) = target {
                recorder.by_target(&target).await?
            } else {
                let count = recorder.count().await?;
                println!("{count} audit entries total. Pass a filter to list them.");
                return Ok(());
            };

            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                print_entry(&entry);
            }
        }
    }

    Ok(())
}

fn print_entry(entry: &AuditLog) {
    println!(
        "#{:<6} {}  {:<20} {} -> {}  {}",
        entry.id,
        entry.timestamp.to_rfc3339(),
        entry.action,
        entry.account_number,
        entry.target_account,
        entry.detail
    );
}
