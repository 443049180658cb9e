//! Export command - download the full data export

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::get_context;

pub fn run(output: Option<PathBuf>) -> Result<()> {
    let ctx = get_context()?;
    let export = ctx.transaction_service.export()?;
    let content = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write export to {:?}", path))?;
            println!("{} Export written to {}", "✓".green(), path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}
