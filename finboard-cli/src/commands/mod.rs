//! CLI command implementations

pub mod accounts;
pub mod balance;
pub mod config;
pub mod export;
pub mod goals;
pub mod monthly;
pub mod stats;
pub mod status;
pub mod tx;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use finboard_core::FinboardContext;

/// Get the finboard directory from environment or default
pub fn get_finboard_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINBOARD_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".finboard"))
}

/// Get or create finboard context
pub fn get_context() -> Result<FinboardContext> {
    let finboard_dir = get_finboard_dir()?;

    std::fs::create_dir_all(&finboard_dir)
        .with_context(|| format!("Failed to create finboard directory: {:?}", finboard_dir))?;
    tracing::debug!(dir = %finboard_dir.display(), "Loading finboard context");

    FinboardContext::new(&finboard_dir).context("Failed to initialize finboard context")
}

/// Parse a user-supplied amount such as `150.50` or `1,000`
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid amount: '{}'", raw))
}

/// Parse `YYYY-MM-DD`
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Use YYYY-MM-DD", raw))
}

/// Parse a date or date-time; a bare date means midnight
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    if let Some(date) = finboard_core::domain::parse_date(raw) {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    anyhow::bail!("Invalid date '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("150.50").unwrap(), Decimal::new(15050, 2));
        assert_eq!(parse_amount(" 1,000 ").unwrap(), Decimal::new(1000, 0));
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime("2024-03-15T10:30").unwrap();
        assert_eq!(dt.to_string(), "2024-03-15 10:30:00");

        let midnight = parse_datetime("2024-03-15").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-15 00:00:00");

        assert!(parse_datetime("15/03/2024").is_err());
    }

    #[test]
    fn test_parse_day() {
        assert!(parse_day("2024-02-30").is_err());
        assert_eq!(
            parse_day("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
