//! Balance command - daily balance history per account

use std::collections::BTreeMap;

use anyhow::Result;
use comfy_table::Cell;

use finboard_core::services::align_series;
use finboard_core::BalancePoint;

use super::get_context;
use crate::output;

pub fn run(account_ids: Vec<i64>, days: Option<u32>, sparse: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let days = days.unwrap_or(ctx.config.history_days);

    let accounts = ctx.account_service.list()?;
    let ids: Vec<i64> = if account_ids.is_empty() {
        accounts.iter().map(|a| a.id).collect()
    } else {
        account_ids
    };
    if ids.is_empty() {
        output::info("No accounts found");
        return Ok(());
    }

    let pb = output::spinner("Loading balance history...");
    let series = if sparse {
        load_sparse(&ctx, &ids, days)
    } else {
        ctx.account_service
            .balance_series(&ids, days, ctx.today())
            .map_err(anyhow::Error::from)
    };
    pb.finish_and_clear();
    let series = series?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let name_of = |id: i64| {
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| format!("Account {}", id))
    };

    let mut table = output::create_table();
    let mut header = vec!["Date".to_string()];
    header.extend(series.keys().map(|id| name_of(*id)));
    table.set_header(header);

    // Every series shares the same dates
    let dates: Vec<_> = series
        .values()
        .next()
        .map(|points| points.iter().map(|p| p.date).collect())
        .unwrap_or_default();

    for (row, date) in dates.iter().enumerate() {
        let mut cells = vec![Cell::new(date.to_string())];
        for points in series.values() {
            let value = points
                .get(row)
                .map(|p| output::balance_amount(p.balance).to_string())
                .unwrap_or_default();
            cells.push(Cell::new(value));
        }
        table.add_row(cells);
    }
    println!("{}", table);

    Ok(())
}

/// Raw histories re-indexed on the union of the reported dates
fn load_sparse(
    ctx: &finboard_core::FinboardContext,
    ids: &[i64],
    days: u32,
) -> Result<BTreeMap<i64, Vec<BalancePoint>>> {
    let mut histories = BTreeMap::new();
    for &id in ids {
        histories.insert(id, ctx.account_service.balance_history(id, days)?);
    }
    Ok(align_series(&histories))
}
