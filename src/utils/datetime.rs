use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Storage format for all subscription dates. Day granularity only.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| anyhow!("Invalid date '{}', expected YYYY-MM-DD", input))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
