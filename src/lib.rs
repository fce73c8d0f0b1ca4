pub mod builder;
pub mod cli;
pub mod csv_source;
pub mod data;
pub mod error;
pub mod extract;
pub mod node;
pub mod placeholder;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands, TemplateArgs, VerifyArgs};
use crate::schema::TableSchema;
use crate::table::ValidateOptions;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("framenode", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Verify(args) => handle_verify(&args),
        Commands::Template(args) => handle_template(&args),
    }
}

fn handle_verify(args: &VerifyArgs) -> Result<()> {
    let schema = TableSchema::load(&args.schema)
        .with_context(|| format!("Loading schema from {:?}", args.schema))?;
    let delimiter = args.delimiter.unwrap_or(b',');
    let mut options = ValidateOptions {
        parallel: args.parallel,
        chunk_rows: args.chunk_rows,
        ..ValidateOptions::default()
    };
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    for input in &args.inputs {
        info!(
            "Verifying '{}' with delimiter '{}'",
            input.display(),
            printable_delimiter(delimiter)
        );
        csv_source::validate_csv_file(&schema, input, delimiter, options)
            .with_context(|| format!("Verifying {input:?}"))?;
        info!(
            "'{}' matches: {} column(s), {} row(s)",
            input.display(),
            schema.columns.len(),
            schema.row_count
        );
    }
    Ok(())
}

fn handle_template(args: &TemplateArgs) -> Result<()> {
    let delimiter = args.delimiter.unwrap_or(b',');
    info!(
        "Templating schema from '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let (headers, rows) = csv_source::csv_shape(&args.input, delimiter)
        .with_context(|| format!("Reading {:?}", args.input))?;
    let data_headers = if args.row_names && !headers.is_empty() {
        &headers[1..]
    } else {
        &headers[..]
    };
    let schema = TableSchema::template(data_headers, rows, args.row_names);
    schema
        .save(&args.schema)
        .with_context(|| format!("Writing schema to {:?}", args.schema))?;
    info!(
        "Template schema for {} column(s) and {} row(s) written to {:?}",
        schema.columns.len(),
        schema.row_count,
        args.schema
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
