//! Command handlers
//!
//! Input validation lives here: the store trusts what it is given, so text,
//! dates, priorities and ids are checked before any store call.

pub mod config;
pub mod menu;
pub mod stats;
pub mod todo;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use ticklist_core::{Priority, TodoId};

/// Trimmed, non-empty todo text
pub fn parse_text(input: &str) -> Result<String> {
    let text = input.trim();
    if text.is_empty() {
        bail!("Todo text cannot be empty.");
    }
    Ok(text.to_string())
}

/// Trimmed, non-empty category name
pub fn parse_category(input: &str) -> Result<String> {
    let name = input.trim();
    if name.is_empty() {
        bail!("Category cannot be empty.");
    }
    Ok(name.to_string())
}

/// A `YYYY-MM-DD` date
pub fn parse_due_date(input: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => bail!("Invalid date '{}'. Use YYYY-MM-DD.", input.trim()),
    }
}

/// Clap value parser for `--due`
pub fn due_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_due_date(input).map_err(|e| e.to_string())
}

/// A priority name (high, medium, low)
pub fn parse_priority(input: &str) -> Result<Priority> {
    Ok(input.parse::<Priority>()?)
}

/// A positive todo id
pub fn parse_id(input: &str) -> Result<TodoId> {
    match input.trim().parse::<TodoId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => bail!("Invalid todo number '{}'. Enter a positive number.", input.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text("  Buy milk ").unwrap(), "Buy milk");
        assert!(parse_text("").is_err());
        assert!(parse_text(" \t ").is_err());
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category(" Work ").unwrap(), "Work");
        assert!(parse_category("").is_err());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_due_date("2023-02-29").is_err());
        assert!(parse_due_date("29/02/2024").is_err());
        assert!(parse_due_date("tomorrow").is_err());

        let message = due_date_arg("soon").unwrap_err();
        assert!(message.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("HIGH").unwrap(), Priority::High);
        assert!(parse_priority("").is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("two").is_err());
    }
}
