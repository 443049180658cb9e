//! Status command - show API health and account summary

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Dashboard Status".bold());
    println!();

    let health = if status.healthy {
        "healthy".green()
    } else {
        "unavailable".red()
    };

    let mut table = output::create_table();
    table.add_row(vec!["API".to_string(), status.api_url.clone()]);
    table.add_row(vec!["Health".to_string(), health.to_string()]);
    if let Some(service) = &status.service {
        table.add_row(vec!["Service".to_string(), service.clone()]);
    }
    table.add_row(vec!["Accounts".to_string(), status.accounts.len().to_string()]);
    table.add_row(vec![
        "Total balance".to_string(),
        output::balance_amount(status.total_balance).to_string(),
    ]);
    println!("{}", table);

    if let Some(err) = &status.error {
        println!();
        output::error(err);
        return Ok(());
    }

    if !status.accounts.is_empty() {
        println!();
        println!("{}", "Accounts".bold());
        for account in &status.accounts {
            println!(
                "  • {} {} {}",
                account.name,
                format!("#{}", account.id).dimmed(),
                output::balance_amount(account.balance)
            );
        }
    }

    Ok(())
}
