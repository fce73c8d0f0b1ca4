//! Typed table cells and the calendar grammars used by string-format
//! validation.
//!
//! A [`Cell`] is the unit the table validator consumes: the external tabular
//! reader (CSV, HDF5) has already tokenized the source into typed fields,
//! and this module only describes their shape plus the conversions the
//! validator needs (whole-number checks, date/date-time parsing via chrono).

use chrono::{DateTime, NaiveDate};

use crate::error::{FrameError, Result};

/// One typed field handed over by the external tabular reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Cell {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Cell::Missing => "missing",
            Cell::Number(_) => "number",
            Cell::Boolean(_) => "boolean",
            Cell::Text(_) => "string",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Typed view of one raw CSV field: empty or `NA` is missing, boolean
    /// literals and numeric text are promoted, everything else stays text.
    pub fn from_csv_field(raw: &str) -> Cell {
        if raw.is_empty() || raw == "NA" {
            return Cell::Missing;
        }
        match raw {
            "true" | "TRUE" => return Cell::Boolean(true),
            "false" | "FALSE" => return Cell::Boolean(false),
            _ => {}
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Cell::Number(value);
        }
        Cell::Text(raw.to_string())
    }
}

/// Returns the value as an `i32` when it is a whole number in range.
pub fn as_whole_i32(value: f64) -> Option<i32> {
    if value.is_finite() && value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64
    {
        Some(value as i32)
    } else {
        None
    }
}

/// Parses a calendar date cell, `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FrameError::TypeMismatch {
        location: format!("'{value}'"),
        expected: "date (YYYY-MM-DD)".to_string(),
        actual: "unparsable text".to_string(),
    })
}

/// Parses an RFC 3339 date-time cell.
pub fn parse_datetime(value: &str) -> Result<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|_| FrameError::TypeMismatch {
        location: format!("'{value}'"),
        expected: "date-time (RFC 3339)".to_string(),
        actual: "unparsable text".to_string(),
    })
}
