//! Transaction commands - list, add, edit and delete

use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use serde::Serialize;

use finboard_core::services::TransactionQuery;
use finboard_core::{NewTransaction, Transaction, TransactionType};

use super::{get_context, parse_amount, parse_datetime};
use crate::output;

#[derive(Subcommand)]
pub enum TxCommands {
    /// List transactions (filters are applied by the API)
    List {
        #[command(flatten)]
        filters: ListFilters,
        /// Fetch every page instead of a single one
        #[arg(long)]
        all: bool,
        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "csv", "json"])]
        format: String,
        /// Output as JSON (shorthand for --format json)
        #[arg(long)]
        json: bool,
    },

    /// Add a transaction; missing fields are prompted for
    Add {
        #[command(flatten)]
        fields: TxFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a transaction; only the given fields change
    Edit {
        /// Transaction ID
        id: i64,
        #[command(flatten)]
        fields: TxFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Args)]
pub struct ListFilters {
    /// Month (1-12)
    #[arg(long)]
    month: Option<u32>,
    /// Year
    #[arg(long)]
    year: Option<i32>,
    /// income or expense
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Account ID
    #[arg(long)]
    account: Option<i64>,
    /// Minimum amount
    #[arg(long)]
    min: Option<String>,
    /// Maximum amount
    #[arg(long)]
    max: Option<String>,
    /// Number of records to skip
    #[arg(long)]
    skip: Option<u32>,
    /// Page size
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
pub struct TxFields {
    /// Date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// income or expense
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    /// Account ID
    #[arg(long)]
    account: Option<i64>,
}

pub fn run(command: TxCommands) -> Result<()> {
    match command {
        TxCommands::List { filters, all, format, json } => {
            let fmt = if json { "json".to_string() } else { format };
            run_list(filters, all, &fmt)
        }
        TxCommands::Add { fields, json } => run_add(fields, json),
        TxCommands::Edit { id, fields, json } => run_edit(id, fields, json),
        TxCommands::Delete { id, force } => run_delete(id, force),
    }
}

impl ListFilters {
    fn to_query(&self) -> Result<TransactionQuery> {
        Ok(TransactionQuery {
            skip: self.skip,
            limit: self.limit,
            month: self.month,
            year: self.year,
            transaction_type: self.kind.as_deref().map(str::parse).transpose()?,
            category: self.category.clone(),
            account_id: self.account,
            min_amount: self.min.as_deref().map(parse_amount).transpose()?,
            max_amount: self.max.as_deref().map(parse_amount).transpose()?,
        })
    }
}

fn run_list(filters: ListFilters, all: bool, format: &str) -> Result<()> {
    let ctx = get_context()?;
    let query = filters.to_query()?;

    let transactions = if all {
        ctx.transaction_service.list_all(&query)?
    } else {
        ctx.transaction_service.list(&query)?
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&transactions)?),
        "csv" => write_csv(&transactions)?,
        _ => print_table(&transactions),
    }

    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    date: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    transaction_type: &'a str,
    category: &'a str,
    amount: String,
    account_id: i64,
}

fn write_csv(transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for tx in transactions {
        let row = CsvRow {
            id: tx.id,
            date: &tx.date,
            description: &tx.description,
            transaction_type: tx.transaction_type.as_wire(),
            category: tx.category_label(),
            amount: output::format_amount(tx.amount),
            account_id: tx.account_id,
        };
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush()?;
    Ok(())
}

fn print_table(transactions: &[Transaction]) {
    if transactions.is_empty() {
        output::info("No transactions found");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Amount", "Account"]);
    for tx in transactions {
        let date = tx
            .parsed_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| tx.date.clone());
        table.add_row(vec![
            tx.id.to_string(),
            date,
            tx.description.clone(),
            tx.category_label().to_string(),
            output::signed_amount(tx.amount, &tx.transaction_type).to_string(),
            tx.account_id.to_string(),
        ]);
    }
    println!("{}", table);
    println!();
    println!("{} transaction(s)", transactions.len());
}

fn run_add(fields: TxFields, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let date = match fields.date {
        Some(d) => parse_datetime(&d)?,
        None => Local::now().naive_local(),
    };
    let description = match fields.description {
        Some(d) => d,
        None => Input::new().with_prompt("Description").interact_text()?,
    };
    let kind = match fields.kind {
        Some(k) => k,
        None => Input::new()
            .with_prompt("Type (income/expense)")
            .default("expense".to_string())
            .interact_text()?,
    };
    let category = match fields.category {
        Some(c) => c,
        None => Input::new()
            .with_prompt("Category")
            .allow_empty(true)
            .interact_text()?,
    };
    let amount = match fields.amount {
        Some(a) => a,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };
    let account_id = match fields.account {
        Some(a) => a,
        None => Input::new().with_prompt("Account ID").interact_text()?,
    };

    let payload = NewTransaction {
        date,
        description,
        transaction_type: kind.parse()?,
        category,
        amount: parse_amount(&amount)?,
        account_id,
    };

    let created = ctx.transaction_service.create(&payload)?;
    print_saved("created", &created, json)
}

fn run_edit(id: i64, fields: TxFields, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let existing = ctx.transaction_service.find(id)?;

    let date = match fields.date {
        Some(d) => parse_datetime(&d)?,
        None => parse_datetime(&existing.date)
            .with_context(|| format!("Transaction {} has an unreadable date; pass --date", id))?,
    };
    let transaction_type: TransactionType = match fields.kind {
        Some(k) => k.parse()?,
        None => existing.transaction_type.clone(),
    };

    let payload = NewTransaction {
        date,
        description: fields.description.unwrap_or_else(|| existing.description.clone()),
        transaction_type,
        category: fields
            .category
            .or_else(|| existing.category.clone())
            .unwrap_or_default(),
        amount: match fields.amount {
            Some(a) => parse_amount(&a)?,
            None => existing.amount,
        },
        account_id: fields.account.unwrap_or(existing.account_id),
    };

    let updated = ctx.transaction_service.update(id, &payload)?;
    print_saved("updated", &updated, json)
}

fn print_saved(action: &str, tx: &Transaction, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tx)?);
    } else {
        println!(
            "{} Transaction {} {}: {} {}",
            "✓".green(),
            tx.id,
            action,
            tx.description,
            output::signed_amount(tx.amount, &tx.transaction_type)
        );
    }
    Ok(())
}

fn run_delete(id: i64, force: bool) -> Result<()> {
    let ctx = get_context()?;

    if !force {
        println!("\n{}", format!("This will permanently delete transaction {}.", id).yellow());
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.transaction_service.delete(id)?;
    output::success(&format!("✓ Transaction {} deleted", id));

    Ok(())
}
