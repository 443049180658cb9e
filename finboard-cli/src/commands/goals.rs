//! Goals command - local savings goals with progress tracking

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, Input};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use finboard_core::domain::{Goal, GoalCategory, GoalDraft};
use finboard_core::ports::SystemClock;
use finboard_core::services::GoalService;

use super::{get_finboard_dir, parse_amount, parse_day};
use crate::output;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List goals with progress and days remaining
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a goal; missing fields are prompted for
    Add {
        #[command(flatten)]
        fields: GoalFields,
    },

    /// Edit a goal; only the given fields change
    Edit {
        /// Goal ID
        id: i64,
        #[command(flatten)]
        fields: GoalFields,
    },

    /// Add money to a goal (a negative amount withdraws)
    Deposit {
        /// Goal ID
        id: i64,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Set the saved amount instead of adding to it
        #[arg(long)]
        set: bool,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Args)]
pub struct GoalFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// savings, house, car, education, travel or emergency
    #[arg(long)]
    category: Option<String>,
    /// Amount to reach
    #[arg(long)]
    target: Option<String>,
    /// Amount already saved
    #[arg(long)]
    current: Option<String>,
    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalView<'a> {
    #[serde(flatten)]
    goal: &'a Goal,
    progress_percentage: f64,
    days_remaining: i64,
    completed: bool,
    overdue: bool,
}

pub fn run(command: GoalCommands) -> Result<()> {
    let goals = GoalService::new(&get_finboard_dir()?, Arc::new(SystemClock));
    let today = Local::now().date_naive();

    match command {
        GoalCommands::List { json } => run_list(&goals, today, json),
        GoalCommands::Add { fields } => run_add(&goals, fields, today),
        GoalCommands::Edit { id, fields } => run_edit(&goals, id, fields, today),
        GoalCommands::Deposit { id, amount, set } => {
            let amount = parse_amount(&amount)?;
            let goal = if set {
                goals.set_progress(id, amount)?
            } else {
                goals.deposit(id, amount)?
            };
            print_saved("updated", &goal, today);
            if goal.is_completed() {
                output::success(&format!("🎉 Goal '{}' reached!", goal.title));
            }
            Ok(())
        }
        GoalCommands::Delete { id, force } => run_delete(&goals, id, force),
    }
}

fn run_list(goals: &GoalService, today: NaiveDate, json: bool) -> Result<()> {
    let all = goals.list()?;

    if json {
        let views: Vec<GoalView> = all
            .iter()
            .map(|goal| GoalView {
                goal,
                progress_percentage: goal.progress_percentage().to_f64().unwrap_or(0.0),
                days_remaining: goal.days_remaining(today),
                completed: goal.is_completed(),
                overdue: goal.is_overdue(today),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if all.is_empty() {
        output::info("No goals yet. Add one with `fb goals add`");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Goal", "Category", "Saved", "Target", "Progress", "Due", "Status"]);
    for goal in &all {
        table.add_row(vec![
            goal.id.to_string(),
            goal.title.clone(),
            goal.category.to_string(),
            output::format_amount(goal.current_amount),
            output::format_amount(goal.target_amount),
            progress_colored(goal).to_string(),
            goal.target_date.format("%Y-%m-%d").to_string(),
            status_label(goal, today).to_string(),
        ]);
    }
    println!("{}", table);

    let saved: Decimal = all.iter().map(|g| g.current_amount).sum();
    let target: Decimal = all.iter().map(|g| g.target_amount).sum();
    let completed = all.iter().filter(|g| g.is_completed()).count();
    println!(
        "{} goal(s), {} completed, {} of {} saved",
        all.len(),
        completed,
        output::format_amount(saved),
        output::format_amount(target)
    );
    Ok(())
}

fn run_add(goals: &GoalService, fields: GoalFields, today: NaiveDate) -> Result<()> {
    let title = match fields.title {
        Some(t) => t,
        None => Input::new().with_prompt("Title").interact_text()?,
    };
    let category = match fields.category {
        Some(c) => c,
        None => Input::new()
            .with_prompt("Category")
            .default(GoalCategory::default().to_string())
            .interact_text()?,
    };
    let target = match fields.target {
        Some(t) => t,
        None => Input::new().with_prompt("Target amount").interact_text()?,
    };
    let date = match fields.date {
        Some(d) => d,
        None => Input::new()
            .with_prompt("Target date (YYYY-MM-DD)")
            .interact_text()?,
    };

    let draft = GoalDraft {
        title,
        description: fields.description.unwrap_or_default(),
        category: category.parse()?,
        target_amount: parse_amount(&target)?,
        current_amount: match fields.current {
            Some(c) => parse_amount(&c)?,
            None => Decimal::ZERO,
        },
        target_date: parse_day(&date)?,
    };

    let goal = goals.add(draft)?;
    print_saved("created", &goal, today);
    Ok(())
}

fn run_edit(goals: &GoalService, id: i64, fields: GoalFields, today: NaiveDate) -> Result<()> {
    let existing = goals.get(id)?;
    let mut draft = GoalDraft::from(&existing);

    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(category) = fields.category {
        draft.category = category.parse()?;
    }
    if let Some(target) = fields.target {
        draft.target_amount = parse_amount(&target)?;
    }
    if let Some(current) = fields.current {
        draft.current_amount = parse_amount(&current)?;
    }
    if let Some(date) = fields.date {
        draft.target_date = parse_day(&date)?;
    }

    let goal = goals.update(id, draft)?;
    print_saved("updated", &goal, today);
    Ok(())
}

fn run_delete(goals: &GoalService, id: i64, force: bool) -> Result<()> {
    let goal = goals.get(id)?;

    if !force {
        println!("\n{}", format!("This will permanently delete goal '{}'.", goal.title).yellow());
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    goals.delete(id)?;
    output::success(&format!("✓ Goal {} deleted", id));
    Ok(())
}

fn print_saved(action: &str, goal: &Goal, today: NaiveDate) {
    println!(
        "{} Goal {} {}: {} {} / {} ({}, {})",
        "✓".green(),
        goal.id,
        action,
        goal.title,
        output::format_amount(goal.current_amount),
        output::format_amount(goal.target_amount),
        progress_colored(goal),
        status_label(goal, today)
    );
}

fn progress_colored(goal: &Goal) -> ColoredString {
    let pct = goal.progress_percentage();
    let text = output::format_percent(pct);
    if pct >= Decimal::ONE_HUNDRED {
        text.green().bold()
    } else if pct >= Decimal::from(75) {
        text.green()
    } else if pct >= Decimal::from(50) {
        text.yellow()
    } else if pct >= Decimal::from(25) {
        text.bright_red()
    } else {
        text.red()
    }
}

fn status_label(goal: &Goal, today: NaiveDate) -> ColoredString {
    let days = goal.days_remaining(today);
    if goal.is_completed() {
        "completed".green()
    } else if goal.is_overdue(today) {
        format!("overdue by {} day(s)", -days).red()
    } else {
        format!("{} day(s) left", days).normal()
    }
}
