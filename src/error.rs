//! Structured error types shared by the node model, placeholder selection,
//! and table validation.
//!
//! Every failure carries the offending column/row/index where one exists, so
//! callers can surface precise diagnostics without re-parsing messages. Parse
//! and validation failures abort the whole operation; there is no partial
//! tree and no partial validation result.

use thiserror::Error;

/// Main error type for framenode operations.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A value of the wrong primitive type was assigned to a node or observed
    /// in a table cell.
    #[error("type mismatch at {location}: expected {expected}, got {actual}")]
    TypeMismatch {
        location: String,
        expected: String,
        actual: String,
    },

    /// An index received both a value and a missing flag, or was assigned
    /// twice. Assignment is exactly-once.
    #[error("index {index} of node {node} was assigned more than once")]
    DoubleAssignment { node: usize, index: usize },

    /// A builder index or level reference outside the node's declared bounds.
    #[error("index {index} is out of bounds for {what} of length {length}")]
    IndexOutOfBounds {
        what: String,
        index: usize,
        length: usize,
    },

    /// A node handed to `finish` still has unpopulated slots.
    #[error("node {node} is incomplete: {detail}")]
    IncompleteNode { node: usize, detail: String },

    /// Column shape, name, or type disagreement between a table and its schema.
    #[error("schema mismatch for column '{column}': {detail}")]
    SchemaMismatch { column: String, detail: String },

    /// A factor cell whose text is not one of the declared levels.
    #[error("unknown level '{value}' at row {row}, column '{column}'")]
    UnknownLevel {
        row: usize,
        column: String,
        value: String,
    },

    /// Observed record count differs from the schema's expected count.
    #[error("expected {expected} data row(s), found {observed}")]
    RowCountMismatch { expected: usize, observed: usize },

    /// A repeated non-missing row label in the row-name column.
    #[error("duplicate row name '{label}' at row {row}")]
    DuplicateRowName { row: usize, label: String },

    /// Every representable value already appears among the observed entries,
    /// so no in-band missing sentinel exists. Distinct from the "no missing
    /// values" outcome, which is a success.
    #[error("no free placeholder value for missing entries in a {domain} buffer")]
    PlaceholderExhausted { domain: &'static str },

    /// The schema description itself is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Error from the CSV reader.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or accessing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for framenode operations.
pub type Result<T> = std::result::Result<T, FrameError>;
