//! CSV-backed [`RowSource`] built on the `csv` crate.
//!
//! Fields are typed eagerly via [`Cell::from_csv_field`]: empty or `NA`
//! fields become missing, `true`/`TRUE`/`false`/`FALSE` become booleans,
//! numeric text becomes a number, anything else stays text. The reader is
//! flexible about field counts so that ragged rows surface as schema errors
//! naming the row, not as reader failures.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::data::Cell;
use crate::error::Result;
use crate::schema::TableSchema;
use crate::table::{RowSource, ValidateOptions, validate_table};

pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl CsvRowSource<BufReader<File>> {
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), delimiter))
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(input: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        CsvRowSource {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn headers(&mut self) -> Result<Vec<String>> {
        let headers = self.reader.headers()?;
        Ok(headers.iter().map(str::to_string).collect())
    }

    fn next_row(&mut self) -> Result<Option<Vec<Cell>>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(Cell::from_csv_field).collect()))
    }
}

/// Validates one CSV file against `schema`.
pub fn validate_csv_file(
    schema: &TableSchema,
    path: &Path,
    delimiter: u8,
    options: ValidateOptions,
) -> Result<()> {
    let mut source = CsvRowSource::open(path, delimiter)?;
    validate_table(schema, &mut source, options)
}

/// Reads only the header row and the record count, for schema templating.
pub fn csv_shape(path: &Path, delimiter: u8) -> Result<(Vec<String>, usize)> {
    let mut source = CsvRowSource::open(path, delimiter)?;
    let headers = source.headers()?;
    let mut rows = 0usize;
    while source.next_row()?.is_some() {
        rows += 1;
    }
    Ok((headers, rows))
}
