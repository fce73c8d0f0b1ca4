//! Streaming validation of tabular sources against a [`TableSchema`].
//!
//! The validator consumes typed rows from a [`RowSource`] (the external
//! CSV/HDF5 reader, already tokenized) and enforces:
//!
//! - column count and case-sensitive names matching the schema exactly, in
//!   order, with a surplus, missing, or misordered column reported as
//!   [`FrameError::SchemaMismatch`] naming the offending column;
//! - per-cell kind compatibility (whole numbers for integer columns, the
//!   two boolean literals for boolean columns, parseable date/date-time
//!   text for formatted string columns, declared levels for factor cells);
//! - an exact total record count, and uniqueness of non-missing row labels
//!   when the schema consumes the first column as row names.
//!
//! Missing cells are permitted in any column regardless of kind;
//! non-nullability is a caller policy, not enforced here.
//!
//! Row indices in errors count data rows from zero, excluding the header.
//!
//! Validation is a single pass. When [`ValidateOptions::parallel`] is set,
//! bounded row chunks are validated concurrently on scoped worker threads
//! over the same immutable schema; the whole table is never materialized,
//! and per-chunk outcomes merge with the first failure in row order winning
//! regardless of completion order.

use std::collections::HashSet;
use std::thread;

use crate::data::{Cell, as_whole_i32, parse_date, parse_datetime};
use crate::error::{FrameError, Result};
use crate::schema::{ColumnKind, ColumnSchema, StringFormat, TableSchema};

/// Stream of typed rows produced by an external tabular reader.
pub trait RowSource {
    /// Column headers, read before any data row.
    fn headers(&mut self) -> Result<Vec<String>>;

    /// Next data row, or `None` at end of input.
    fn next_row(&mut self) -> Result<Option<Vec<Cell>>>;
}

/// Execution hints for a validation pass.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// Validate independent row chunks concurrently.
    pub parallel: bool,
    /// Rows per chunk in parallel mode.
    pub chunk_rows: usize,
    /// Worker threads per batch in parallel mode.
    pub workers: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            parallel: false,
            chunk_rows: 1024,
            workers: thread::available_parallelism().map_or(4, |n| n.get()),
        }
    }
}

struct ColumnCheck<'a> {
    schema: &'a ColumnSchema,
    levels: HashSet<&'a str>,
}

impl<'a> ColumnCheck<'a> {
    fn new(schema: &'a ColumnSchema) -> Self {
        ColumnCheck {
            schema,
            levels: schema.levels.iter().map(String::as_str).collect(),
        }
    }

    fn check(&self, row: usize, cell: &Cell) -> Result<()> {
        if cell.is_missing() {
            return Ok(());
        }
        let mismatch = |expected: &str| FrameError::TypeMismatch {
            location: format!("row {row}, column '{}'", self.schema.name),
            expected: expected.to_string(),
            actual: cell.kind_name().to_string(),
        };
        match self.schema.kind {
            ColumnKind::Integer => match cell {
                Cell::Number(v) if as_whole_i32(*v).is_some() => Ok(()),
                _ => Err(mismatch("32-bit integer")),
            },
            ColumnKind::Number => match cell {
                Cell::Number(_) => Ok(()),
                _ => Err(mismatch("number")),
            },
            ColumnKind::Boolean => match cell {
                Cell::Boolean(_) => Ok(()),
                _ => Err(mismatch("boolean")),
            },
            ColumnKind::String => match cell {
                Cell::Text(text) => match self.schema.format {
                    StringFormat::None => Ok(()),
                    StringFormat::Date => parse_date(text).map(|_| ()).map_err(|_| {
                        mismatch("date (YYYY-MM-DD)")
                    }),
                    StringFormat::DateTime => parse_datetime(text).map(|_| ()).map_err(|_| {
                        mismatch("date-time (RFC 3339)")
                    }),
                },
                _ => Err(mismatch("string")),
            },
            ColumnKind::Factor => match cell {
                Cell::Text(text) => {
                    if self.levels.contains(text.as_str()) {
                        Ok(())
                    } else {
                        Err(FrameError::UnknownLevel {
                            row,
                            column: self.schema.name.clone(),
                            value: text.clone(),
                        })
                    }
                }
                _ => Err(mismatch("factor level")),
            },
            ColumnKind::Opaque => Ok(()),
        }
    }
}

/// Validates a streamed tabular source against one schema.
pub struct TableValidator<'a> {
    schema: &'a TableSchema,
    checks: Vec<ColumnCheck<'a>>,
    options: ValidateOptions,
}

impl<'a> TableValidator<'a> {
    pub fn new(schema: &'a TableSchema, options: ValidateOptions) -> Result<Self> {
        schema.validate()?;
        let checks = schema.columns.iter().map(ColumnCheck::new).collect();
        Ok(TableValidator {
            schema,
            checks,
            options,
        })
    }

    /// Runs the full pass: headers, every data row, then the record count.
    pub fn validate(&self, source: &mut dyn RowSource) -> Result<()> {
        let headers = source.headers()?;
        self.check_headers(&headers)?;
        if self.options.parallel {
            self.validate_rows_parallel(source)
        } else {
            self.validate_rows_sequential(source)
        }
    }

    fn check_headers(&self, headers: &[String]) -> Result<()> {
        // The row-name column, when declared, is consumed positionally; its
        // header text is not constrained.
        let data_headers = if self.schema.has_row_names {
            if headers.is_empty() {
                return Err(FrameError::SchemaMismatch {
                    column: "<row names>".to_string(),
                    detail: "source has no columns but row names are expected".to_string(),
                });
            }
            &headers[1..]
        } else {
            headers
        };

        for (index, column) in self.schema.columns.iter().enumerate() {
            match data_headers.get(index) {
                Some(observed) if *observed == column.name => {}
                Some(observed) => {
                    return Err(FrameError::SchemaMismatch {
                        column: column.name.clone(),
                        detail: format!(
                            "expected at position {index}, found '{observed}'"
                        ),
                    });
                }
                None => {
                    return Err(FrameError::SchemaMismatch {
                        column: column.name.clone(),
                        detail: "column is missing from the source".to_string(),
                    });
                }
            }
        }
        if data_headers.len() > self.schema.columns.len() {
            return Err(FrameError::SchemaMismatch {
                column: data_headers[self.schema.columns.len()].clone(),
                detail: "column is not declared in the schema".to_string(),
            });
        }
        Ok(())
    }

    /// Splits off and checks the row-name cell, returning the data cells.
    fn strip_row_name(
        &self,
        row: usize,
        mut cells: Vec<Cell>,
        seen_labels: &mut HashSet<String>,
    ) -> Result<Vec<Cell>> {
        if !self.schema.has_row_names {
            return Ok(cells);
        }
        if cells.is_empty() {
            return Err(FrameError::SchemaMismatch {
                column: "<row names>".to_string(),
                detail: format!("row {row} has no fields"),
            });
        }
        match cells.remove(0) {
            Cell::Missing => Ok(cells),
            Cell::Text(label) => {
                if !seen_labels.insert(label.clone()) {
                    return Err(FrameError::DuplicateRowName { row, label });
                }
                Ok(cells)
            }
            other => Err(FrameError::TypeMismatch {
                location: format!("row {row}, row-name column"),
                expected: "string label".to_string(),
                actual: other.kind_name().to_string(),
            }),
        }
    }

    fn validate_row(&self, row: usize, cells: &[Cell]) -> Result<()> {
        if cells.len() != self.checks.len() {
            return Err(FrameError::SchemaMismatch {
                column: self
                    .schema
                    .columns
                    .get(cells.len())
                    .map_or_else(|| "<surplus field>".to_string(), |c| c.name.clone()),
                detail: format!(
                    "row {row} has {} data field(s), expected {}",
                    cells.len(),
                    self.checks.len()
                ),
            });
        }
        for (check, cell) in self.checks.iter().zip(cells) {
            check.check(row, cell)?;
        }
        Ok(())
    }

    fn check_row_count(&self, observed: usize) -> Result<()> {
        if observed != self.schema.row_count {
            return Err(FrameError::RowCountMismatch {
                expected: self.schema.row_count,
                observed,
            });
        }
        Ok(())
    }

    fn validate_rows_sequential(&self, source: &mut dyn RowSource) -> Result<()> {
        let mut seen_labels = HashSet::new();
        let mut observed = 0usize;
        while let Some(cells) = source.next_row()? {
            let row = observed;
            observed += 1;
            if observed > self.schema.row_count {
                observed += drain_remaining(source)?;
                return self.check_row_count(observed);
            }
            let cells = self.strip_row_name(row, cells, &mut seen_labels)?;
            self.validate_row(row, &cells)?;
        }
        self.check_row_count(observed)
    }

    fn validate_rows_parallel(&self, source: &mut dyn RowSource) -> Result<()> {
        let chunk_rows = self.options.chunk_rows.max(1);
        let workers = self.options.workers.max(1);

        let mut seen_labels = HashSet::new();
        let mut observed = 0usize;
        // Error noticed while reading (duplicate label, overflow); queued
        // chunks hold strictly earlier rows and take precedence over it.
        let mut pending: Option<FrameError> = None;
        let mut done = false;

        while !done && pending.is_none() {
            // Accumulate one batch of chunks, stripping row names in reading
            // order so label bookkeeping stays sequential and cheap.
            let mut batch: Vec<(usize, Vec<Vec<Cell>>)> = Vec::with_capacity(workers);
            while batch.len() < workers {
                let start_row = observed;
                let mut chunk = Vec::with_capacity(chunk_rows);
                while chunk.len() < chunk_rows {
                    match source.next_row()? {
                        None => {
                            done = true;
                            break;
                        }
                        Some(cells) => {
                            let row = observed;
                            observed += 1;
                            if observed > self.schema.row_count {
                                observed += drain_remaining(source)?;
                                pending = Some(FrameError::RowCountMismatch {
                                    expected: self.schema.row_count,
                                    observed,
                                });
                                done = true;
                                break;
                            }
                            match self.strip_row_name(row, cells, &mut seen_labels) {
                                Ok(cells) => chunk.push(cells),
                                Err(err) => {
                                    pending = Some(err);
                                    done = true;
                                    break;
                                }
                            }
                        }
                    }
                }
                if !chunk.is_empty() {
                    batch.push((start_row, chunk));
                }
                if done || pending.is_some() {
                    break;
                }
            }

            if !batch.is_empty() {
                let mut outcomes = Vec::with_capacity(batch.len());
                thread::scope(|scope| {
                    let handles: Vec<_> = batch
                        .iter()
                        .map(|(start_row, chunk)| {
                            scope.spawn(move || self.validate_chunk(*start_row, chunk))
                        })
                        .collect();
                    for handle in handles {
                        outcomes.push(handle.join().expect("validator worker panicked"));
                    }
                });
                // Chunks are in row order, so the first failing chunk holds
                // the lowest failing row.
                for outcome in outcomes {
                    outcome?;
                }
            }
        }

        if let Some(err) = pending {
            return Err(err);
        }
        self.check_row_count(observed)
    }

    fn validate_chunk(&self, start_row: usize, rows: &[Vec<Cell>]) -> Result<()> {
        for (offset, cells) in rows.iter().enumerate() {
            self.validate_row(start_row + offset, cells)?;
        }
        Ok(())
    }
}

fn drain_remaining(source: &mut dyn RowSource) -> Result<usize> {
    let mut extra = 0usize;
    while source.next_row()?.is_some() {
        extra += 1;
    }
    Ok(extra)
}

/// One-shot convenience wrapper over [`TableValidator`].
pub fn validate_table(
    schema: &TableSchema,
    source: &mut dyn RowSource,
    options: ValidateOptions,
) -> Result<()> {
    TableValidator::new(schema, options)?.validate(source)
}
