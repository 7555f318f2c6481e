use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::application::{
    AccountHistory, BankTxParams, BankTxResult, TransferService, TransferTxParams,
    preflight_bank_transfer, preflight_transfer,
};
use crate::config::LedgerConfig;
use crate::domain::{AccountId, Amount, BankAccountId, BankDirection, NewAccount};
use crate::storage::{LedgerQueries, Page, SqliteStore};

/// psp-ledger - transactional money movement for a payment service provider
#[derive(Parser)]
#[command(name = "psp-ledger")]
#[command(about = "Move money between ledger accounts and external banks atomically")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides DATABASE_URL)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Abort a unit of work that runs longer than this many milliseconds
    #[arg(long, global = true)]
    pub tx_timeout_ms: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Move money between two internal accounts
    Transfer {
        /// Source account id
        #[arg(long)]
        from: AccountId,

        /// Destination account id
        #[arg(long)]
        to: AccountId,

        /// Amount in the currency's smallest unit
        #[arg(long)]
        amount: Amount,

        /// Currency both accounts must hold
        #[arg(short, long)]
        currency: String,
    },

    /// Move money between an internal account and an external bank
    #[command(subcommand)]
    Bank(BankCommands),
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account
    Open {
        /// Owner identity
        #[arg(long)]
        owner: String,

        /// Currency code (e.g., USD, EUR)
        #[arg(short, long)]
        currency: String,

        /// Opening balance in the currency's smallest unit
        #[arg(long, default_value = "0")]
        balance: Amount,
    },

    /// Show an account and its ledger history
    Show {
        id: AccountId,

        /// Maximum rows per section
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// List accounts belonging to an owner
    List {
        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand)]
pub enum BankCommands {
    /// Send money from an account to an external bank account
    Send(BankArgs),

    /// Receive money from an external bank account into an account
    Receive(BankArgs),
}

#[derive(clap::Args)]
pub struct BankArgs {
    /// Internal account id
    #[arg(long)]
    account: AccountId,

    /// External bank account reference
    #[arg(long)]
    bank_account: BankAccountId,

    /// Amount in the currency's smallest unit
    #[arg(long)]
    amount: Amount,

    /// Currency the account must hold
    #[arg(short, long)]
    currency: String,
}

impl Cli {
    /// Environment config with command-line overrides applied.
    pub fn config(&self) -> LedgerConfig {
        let mut config = LedgerConfig::from_env();
        if let Some(path) = &self.database {
            config.database_url = LedgerConfig::for_path(path).database_url;
        }
        if let Some(ms) = self.tx_timeout_ms {
            config.tx_timeout_ms = Some(ms);
        }
        config
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();
        let json = self.json;

        if let Commands::Init = self.command {
            SqliteStore::init(&config)
                .await
                .context("Failed to initialize database")?;
            println!("Database initialized: {}", config.database_url);
            return Ok(());
        }

        let store = SqliteStore::connect(&config)
            .await
            .context("Failed to open database")?;

        match self.command {
            Commands::Init => {}

            Commands::Account(cmd) => run_account_command(&store, cmd, json).await?,

            Commands::Transfer {
                from,
                to,
                amount,
                currency,
            } => {
                let params = TransferTxParams {
                    from_account_id: from,
                    to_account_id: to,
                    amount,
                };
                preflight_transfer(&mut store.queries().await?, &params, &currency).await?;

                let service = TransferService::new(store);
                let result = service.transfer(params).await?;
                emit(json, &result, |r| {
                    format!(
                        "Transfer {}: account {} -> account {}, {}\n  account {}: {} {}\n  account {}: {} {}",
                        r.transfer.id,
                        r.transfer.from_account_id,
                        r.transfer.to_account_id,
                        r.transfer.amount,
                        r.from_account.id,
                        r.from_account.balance,
                        r.from_account.currency,
                        r.to_account.id,
                        r.to_account.balance,
                        r.to_account.currency,
                    )
                })?;
            }

            Commands::Bank(cmd) => {
                let (args, direction) = match cmd {
                    BankCommands::Send(args) => (args, BankDirection::Outbound),
                    BankCommands::Receive(args) => (args, BankDirection::Inbound),
                };
                run_bank_command(store, args, direction, json).await?;
            }
        }

        Ok(())
    }
}

async fn run_account_command(store: &SqliteStore, cmd: AccountCommands, json: bool) -> Result<()> {
    match cmd {
        AccountCommands::Open {
            owner,
            currency,
            balance,
        } => {
            let new = NewAccount::new(owner, currency).with_balance(balance);
            let account = store.queries().await?.create_account(&new).await?;
            emit(json, &account, |a| {
                format!(
                    "Opened account {} for {}: {} {}",
                    a.id, a.owner, a.balance, a.currency
                )
            })?;
        }

        AccountCommands::Show { id, limit } => {
            let service = TransferService::new(store.clone());
            let history = service.account_history(id, Page::new(limit, 0)).await?;
            emit(json, &history, format_history)?;
        }

        AccountCommands::List { owner } => {
            let accounts = store
                .queries()
                .await?
                .list_accounts(&owner, Page::default())
                .await?;
            emit(json, &accounts, |accounts| {
                if accounts.is_empty() {
                    return "No accounts found.".to_string();
                }
                let mut out = format!("{:<8} {:>14} {:<8}", "ID", "BALANCE", "CURRENCY");
                out.push_str(&format!("\n{}", "-".repeat(32)));
                for a in accounts {
                    out.push_str(&format!("\n{:<8} {:>14} {:<8}", a.id, a.balance, a.currency));
                }
                out
            })?;
        }
    }
    Ok(())
}

async fn run_bank_command(
    store: SqliteStore,
    args: BankArgs,
    direction: BankDirection,
    json: bool,
) -> Result<()> {
    let params = BankTxParams {
        account_id: args.account,
        bank_account_id: args.bank_account,
        amount: args.amount,
    };
    preflight_bank_transfer(&mut store.queries().await?, &params, &args.currency, direction)
        .await?;

    let service = TransferService::new(store);
    let result = match direction {
        BankDirection::Outbound => service.send_to_bank(params).await?,
        BankDirection::Inbound => service.receive_from_bank(params).await?,
    };

    emit(json, &result, format_bank_result)
}

fn format_bank_result(r: &BankTxResult) -> String {
    format!(
        "Bank transfer {} ({}): account {} / bank account {}, {}\n  account {}: {} {}",
        r.transfer.id,
        r.direction,
        r.transfer.account_id,
        r.transfer.bank_account_id,
        r.transfer.amount,
        r.account.id,
        r.account.balance,
        r.account.currency,
    )
}

fn format_history(h: &AccountHistory) -> String {
    let mut out = format!(
        "Account {} ({}): {} {}",
        h.account.id, h.account.owner, h.account.balance, h.account.currency
    );

    out.push_str("\n\nEntries:");
    if h.entries.is_empty() {
        out.push_str("\n  (none)");
    }
    for e in &h.entries {
        out.push_str(&format!("\n  #{:<6} {:>12}  {}", e.id, e.amount, e.created_at.to_rfc3339()));
    }

    out.push_str("\n\nTransfers:");
    if h.transfers.is_empty() {
        out.push_str("\n  (none)");
    }
    for t in &h.transfers {
        out.push_str(&format!(
            "\n  #{:<6} {} -> {} {:>12}",
            t.id,
            t.from_account_id,
            t.to_account_id,
            t.delta_for(h.account.id)
        ));
    }

    out.push_str("\n\nBank transfers:");
    if h.bank_transfers.is_empty() {
        out.push_str("\n  (none)");
    }
    for b in &h.bank_transfers {
        out.push_str(&format!(
            "\n  #{:<6} {:<8} bank account {} {:>12}",
            b.id,
            b.direction().as_str(),
            b.bank_account_id,
            b.amount
        ));
    }

    out
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}
