//! Table schema model and YAML persistence.
//!
//! A [`TableSchema`] describes the exact tabular shape a data frame source
//! must satisfy: ordered columns (name, kind, optional string format, factor
//! levels), an expected row count, and whether the first column carries row
//! names. Schemas are persisted as YAML via `serde_yaml` and validated for
//! internal consistency before use.

use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Column kinds a schema may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Whole-number cells representable as 32-bit signed integers.
    Integer,
    /// Any numeric cell.
    Number,
    String,
    Boolean,
    /// Cells drawn from a declared level dictionary.
    Factor,
    /// Externally validated column; any cell is accepted.
    Opaque,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Number => "number",
            ColumnKind::String => "string",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Factor => "factor",
            ColumnKind::Opaque => "opaque",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["integer", "number", "string", "boolean", "factor", "opaque"]
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = FrameError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(ColumnKind::Integer),
            "number" | "float" | "double" => Ok(ColumnKind::Number),
            "string" => Ok(ColumnKind::String),
            "boolean" | "bool" => Ok(ColumnKind::Boolean),
            "factor" => Ok(ColumnKind::Factor),
            "opaque" | "other" => Ok(ColumnKind::Opaque),
            other => Err(FrameError::InvalidSchema(format!(
                "unknown column kind '{other}'. Supported kinds: {}",
                ColumnKind::variants().join(", ")
            ))),
        }
    }
}

/// Constrained text grammar for string columns.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    #[default]
    None,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 date-time.
    DateTime,
}

impl StringFormat {
    pub fn is_none(&self) -> bool {
        matches!(self, StringFormat::None)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One expected column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "StringFormat::is_none")]
    pub format: StringFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ordered: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        ColumnSchema {
            name: name.into(),
            kind,
            format: StringFormat::None,
            levels: Vec::new(),
            ordered: false,
        }
    }

    pub fn string_with_format(name: impl Into<String>, format: StringFormat) -> Self {
        ColumnSchema {
            format,
            ..Self::new(name, ColumnKind::String)
        }
    }

    pub fn factor(name: impl Into<String>, levels: Vec<String>, ordered: bool) -> Self {
        ColumnSchema {
            levels,
            ordered,
            ..Self::new(name, ColumnKind::Factor)
        }
    }
}

/// Ordered column descriptions plus the expected record count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
    pub row_count: usize,
    #[serde(default)]
    pub has_row_names: bool,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnSchema>, row_count: usize, has_row_names: bool) -> Self {
        TableSchema {
            columns,
            row_count,
            has_row_names,
        }
    }

    /// Starter schema for a header row: every column is a plain string.
    pub fn template(headers: &[String], row_count: usize, has_row_names: bool) -> Self {
        let columns = headers
            .iter()
            .map(|name| ColumnSchema::new(name.clone(), ColumnKind::String))
            .collect();
        TableSchema::new(columns, row_count, has_row_names)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let schema: TableSchema = serde_yaml::from_reader(reader)
            .map_err(|err| FrameError::InvalidSchema(err.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let file = File::create(path)?;
        serde_yaml::to_writer(file, self).map_err(|err| FrameError::InvalidSchema(err.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        self.validate()?;
        serde_yaml::to_string(self).map_err(|err| FrameError::InvalidSchema(err.to_string()))
    }

    /// Checks the schema's internal consistency: unique column names, level
    /// dictionaries only on factor columns (unique, and non-empty when
    /// ordered), string formats only on string columns.
    pub fn validate(&self) -> Result<()> {
        let duplicates: Vec<&str> = self
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .duplicates()
            .collect();
        if !duplicates.is_empty() {
            return Err(FrameError::InvalidSchema(format!(
                "duplicate column name(s): {}",
                duplicates.join(", ")
            )));
        }

        for column in &self.columns {
            if !column.format.is_none() && column.kind != ColumnKind::String {
                return Err(FrameError::InvalidSchema(format!(
                    "column '{}' declares a string format but is {}",
                    column.name, column.kind
                )));
            }
            if column.kind == ColumnKind::Factor {
                let dup_levels: Vec<&str> = column
                    .levels
                    .iter()
                    .map(String::as_str)
                    .duplicates()
                    .collect();
                if !dup_levels.is_empty() {
                    return Err(FrameError::InvalidSchema(format!(
                        "column '{}' repeats factor level(s): {}",
                        column.name,
                        dup_levels.join(", ")
                    )));
                }
                if column.ordered && column.levels.is_empty() {
                    return Err(FrameError::InvalidSchema(format!(
                        "column '{}' is an ordered factor with no levels",
                        column.name
                    )));
                }
            } else if !column.levels.is_empty() {
                return Err(FrameError::InvalidSchema(format!(
                    "column '{}' declares factor levels but is {}",
                    column.name, column.kind
                )));
            }
        }
        Ok(())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
