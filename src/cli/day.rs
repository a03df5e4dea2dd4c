use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::utils::time::parse_day_key;

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Resolves the `day` argument. Accepts day keys (`Mon Oct 19 2026`), ISO dates and anything
/// `chrono_english` understands, e.g. "yesterday" or "15/03/2025". Defaults to today.
pub fn parse_day(date: Option<&str>, style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    let Some(date) = date else {
        return Ok(now.date_naive());
    };
    if let Some(day) = parse_day_key(date) {
        return Ok(day);
    }
    match parse_date_string(date, now, style.into()) {
        Ok(v) => Ok(v.with_timezone(&Local).date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}
