//! Bank of Madras CLI - ledger operations from command line
//!
//! Usage:
//! ```bash
//! bom init
//! bom account open --name "Priya Raman" --email priya@example.com --mobile 9876543210
//! bom tx deposit BOM0000001 500
//! bom tx transfer BOM0000001 BOM0000002 125.50
//! bom fd open BOM0000001 1000 12
//! bom fd sweep
//! bom audit list --actor BOM0000001
//! bom scheduler --hour 21
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;
mod db;

use commands::{account, audit, fd, tx};

/// Bank of Madras - retail ledger over SQLite
#[derive(Parser)]
#[command(name = "bom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/bom.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Ledger transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Fixed deposits
    Fd {
        #[command(subcommand)]
        action: FdAction,
    },

    /// Audit trail
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Run the daily maturity scheduler in the foreground
    Scheduler {
        /// UTC hour of day (0-23) the sweep fires at
        #[arg(long, default_value_t = 21)]
        hour: u32,
    },

    /// Initialize the database schema
    Init,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Open a new account
    Open {
        /// Holder name
        #[arg(long, short)]
        name: String,
        /// Email (must be unused)
        #[arg(long, short)]
        email: String,
        /// Mobile number (must be unused)
        #[arg(long, short)]
        mobile: String,
    },
    /// Show account details
    Show {
        /// Account number (BOM + 7 digits)
        account_number: String,
    },
    /// List all accounts
    List,
    /// Block an account
    Block { account_number: String },
    /// Unblock an account
    Unblock { account_number: String },
    /// Deactivate an account (balance must be zero)
    Close { account_number: String },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Deposit funds into an account
    Deposit {
        account_number: String,
        amount: Decimal,
        /// Free-form description
        #[arg(long, short, default_value = "Cash deposit")]
        description: String,
    },
    /// Withdraw funds from an account
    Withdraw {
        account_number: String,
        amount: Decimal,
        #[arg(long, short, default_value = "Cash withdrawal")]
        description: String,
    },
    /// Transfer funds between two accounts
    Transfer {
        from_account: String,
        to_account: String,
        amount: Decimal,
        #[arg(long, short, default_value = "Transfer")]
        description: String,
    },
    /// Show transaction history, newest first
    History {
        account_number: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

#[derive(Subcommand)]
pub enum FdAction {
    /// Open a fixed deposit, debiting the principal
    Open {
        account_number: String,
        principal: Decimal,
        duration_months: u32,
        #[arg(long, short, default_value = "Fixed deposit")]
        description: String,
    },
    /// Close a fixed deposit before maturity at a penalized rate
    Close {
        deposit_id: i64,
        /// Owning account number
        #[arg(long)]
        account: String,
    },
    /// List active deposits for an account
    List { account_number: String },
    /// Mature every deposit whose maturity date has passed
    Sweep,
}

#[derive(Subcommand)]
pub enum AuditAction {
    /// List audit entries, newest first
    List {
        /// Filter by acting account
        #[arg(long)]
        actor: Option<String>,
        /// Filter by action kind (e.g. deposit, transfer, created_fd)
        #[arg(long)]
        action: Option<String>,
        /// Filter by target account
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Some(parent) = cli.db.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    match cli.command {
        Commands::Init => {
            let database = db::connect(&cli.db).await?;
            database.init_schema().await?;
            println!("Database initialized at {:?}", cli.db);
        }

        Commands::Account { action } => {
            account::handle(&cli.db, action).await?;
        }

        Commands::Tx { action } => {
            tx::handle(&cli.db, action).await?;
        }

        Commands::Fd { action } => {
            fd::handle(&cli.db, action).await?;
        }

        Commands::Audit { action } => {
            audit::handle(&cli.db, action).await?;
        }

        Commands::Scheduler { hour } => {
            anyhow::ensure!(hour < 24, "hour must be between 0 and 23");
            commands::run_scheduler(&cli.db, hour).await?;
        }
    }

    Ok(())
}
