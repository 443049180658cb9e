//! Accounts command - list and rename accounts

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List accounts with their balances
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename an account
    Rename {
        /// Account ID
        id: i64,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::List { json } => run_list(json),
        AccountCommands::Rename { id, name, json } => run_rename(id, &name, json),
    }
}

fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let accounts = ctx.account_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        output::info("No accounts found");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Balance"]);
    for account in &accounts {
        table.add_row(vec![
            account.id.to_string(),
            account.name.clone(),
            output::balance_amount(account.balance).to_string(),
        ]);
    }
    println!("{}", table);

    Ok(())
}

fn run_rename(id: i64, name: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let account = ctx.account_service.rename(id, name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
    } else {
        println!("{} Account {} renamed to '{}'", "✓".green(), id, account.name);
    }

    Ok(())
}
