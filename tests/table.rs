mod common;

use common::TestWorkspace;
use framenode::csv_source::{CsvRowSource, validate_csv_file};
use framenode::error::FrameError;
use framenode::schema::{ColumnKind, ColumnSchema, StringFormat, TableSchema};
use framenode::table::{ValidateOptions, validate_table};

fn sample_schema() -> TableSchema {
    TableSchema::new(
        vec![
            ColumnSchema::new("id", ColumnKind::Integer),
            ColumnSchema::new("score", ColumnKind::Number),
            ColumnSchema::new("active", ColumnKind::Boolean),
            ColumnSchema::factor(
                "grp",
                vec!["a".to_string(), "b".to_string()],
                false,
            ),
        ],
        3,
        false,
    )
}

fn validate_str(schema: &TableSchema, csv: &str, options: ValidateOptions) -> Result<(), FrameError> {
    let mut source = CsvRowSource::from_reader(csv.as_bytes(), b',');
    validate_table(schema, &mut source, options)
}

#[test]
fn valid_source_passes() {
    let csv = "id,score,active,grp\n1,0.5,true,a\n2,NA,false,b\nNA,1.25,TRUE,a\n";
    validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap();
}

#[test]
fn permuted_columns_are_rejected() {
    let csv = "score,id,active,grp\n0.5,1,true,a\n0.1,2,false,b\n0.2,3,true,a\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::SchemaMismatch { column, .. } => assert_eq!(column, "id"),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn surplus_and_missing_columns_are_rejected() {
    let csv = "id,score,active,grp,extra\n1,0.5,true,a,x\n2,0.1,false,b,y\n3,0.2,true,a,z\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::SchemaMismatch { column, .. } => assert_eq!(column, "extra"),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }

    let csv = "id,score,active\n1,0.5,true\n2,0.1,false\n3,0.2,true\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::SchemaMismatch { column, .. } => assert_eq!(column, "grp"),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn row_count_is_exact_in_both_directions() {
    let csv = "id,score,active,grp\n1,0.5,true,a\n2,0.1,false,b\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        FrameError::RowCountMismatch {
            expected: 3,
            observed: 2
        }
    ));

    let csv = "id,score,active,grp\n1,0.5,true,a\n2,0.1,false,b\n3,0.2,true,a\n4,0.3,false,b\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        FrameError::RowCountMismatch {
            expected: 3,
            observed: 4
        }
    ));
}

#[test]
fn unknown_factor_level_names_the_row_and_column() {
    let csv = "id,score,active,grp\n1,0.5,true,a\n2,0.1,false,c\n3,0.2,true,b\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::UnknownLevel { row, column, value } => {
            assert_eq!(row, 1);
            assert_eq!(column, "grp");
            assert_eq!(value, "c");
        }
        other => panic!("expected UnknownLevel, got {other:?}"),
    }
}

#[test]
fn integer_cells_must_be_whole_and_in_range() {
    let csv = "id,score,active,grp\n1.5,0.5,true,a\n2,0.1,false,b\n3,0.2,true,a\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));

    let csv = "id,score,active,grp\n3000000000,0.5,true,a\n2,0.1,false,b\n3,0.2,true,a\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
}

#[test]
fn boolean_cells_accept_only_the_literal_forms() {
    let csv = "id,score,active,grp\n1,0.5,yes,a\n2,0.1,false,b\n3,0.2,true,a\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
}

#[test]
fn date_and_datetime_formats_are_enforced() {
    let schema = TableSchema::new(
        vec![
            ColumnSchema::string_with_format("day", StringFormat::Date),
            ColumnSchema::string_with_format("stamp", StringFormat::DateTime),
        ],
        2,
        false,
    );
    let csv = "day,stamp\n2024-05-06,2024-05-06T14:30:00+00:00\nNA,NA\n";
    validate_str(&schema, csv, ValidateOptions::default()).unwrap();

    let csv = "day,stamp\n2024-02-30,2024-05-06T14:30:00+00:00\n2024-05-07,NA\n";
    let err = validate_str(&schema, csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));

    let csv = "day,stamp\n2024-05-06,06/05/2024 14:30\n2024-05-07,NA\n";
    let err = validate_str(&schema, csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
}

#[test]
fn opaque_columns_accept_any_cell() {
    let schema = TableSchema::new(
        vec![ColumnSchema::new("blob", ColumnKind::Opaque)],
        3,
        false,
    );
    let csv = "blob\n42\ntrue\nanything at all\n";
    validate_str(&schema, csv, ValidateOptions::default()).unwrap();
}

#[test]
fn row_names_must_be_unique_strings() {
    let mut schema = sample_schema();
    schema.has_row_names = true;
    let csv = "name,id,score,active,grp\nr1,1,0.5,true,a\nr2,2,0.1,false,b\nr1,3,0.2,true,a\n";
    let err = validate_str(&schema, csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::DuplicateRowName { row, label } => {
            assert_eq!(row, 2);
            assert_eq!(label, "r1");
        }
        other => panic!("expected DuplicateRowName, got {other:?}"),
    }

    let csv = "name,id,score,active,grp\n7,1,0.5,true,a\nr2,2,0.1,false,b\nr3,3,0.2,true,a\n";
    let err = validate_str(&schema, csv, ValidateOptions::default()).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
}

#[test]
fn parallel_mode_agrees_with_sequential() {
    let mut rows = String::from("id,score,active,grp\n");
    for i in 0..50 {
        rows.push_str(&format!("{i},0.5,true,a\n"));
    }
    let mut schema = sample_schema();
    schema.row_count = 50;
    // Small chunks force several batches.
    let options = ValidateOptions {
        parallel: true,
        chunk_rows: 4,
        workers: 3,
    };
    validate_str(&schema, &rows, options).unwrap();
    validate_str(&schema, &rows, ValidateOptions::default()).unwrap();
}

#[test]
fn parallel_mode_reports_the_lowest_failing_row() {
    let mut rows = String::from("id,score,active,grp\n");
    for i in 0..40 {
        let level = if i == 7 || i == 25 { "zzz" } else { "b" };
        rows.push_str(&format!("{i},0.5,true,{level}\n"));
    }
    let mut schema = sample_schema();
    schema.row_count = 40;
    let options = ValidateOptions {
        parallel: true,
        chunk_rows: 4,
        workers: 4,
    };
    let err = validate_str(&schema, &rows, options).unwrap_err();
    match err {
        FrameError::UnknownLevel { row, value, .. } => {
            assert_eq!(row, 7);
            assert_eq!(value, "zzz");
        }
        other => panic!("expected UnknownLevel, got {other:?}"),
    }
}

#[test]
fn parallel_row_count_mismatch_matches_sequential() {
    let mut rows = String::from("id,score,active,grp\n");
    for i in 0..10 {
        rows.push_str(&format!("{i},0.5,true,a\n"));
    }
    let mut schema = sample_schema();
    schema.row_count = 6;
    let options = ValidateOptions {
        parallel: true,
        chunk_rows: 4,
        workers: 2,
    };
    let err = validate_str(&schema, &rows, options).unwrap_err();
    assert!(matches!(
        err,
        FrameError::RowCountMismatch {
            expected: 6,
            observed: 10
        }
    ));
}

#[test]
fn ragged_rows_are_reported_as_schema_errors() {
    let csv = "id,score,active,grp\n1,0.5,true\n2,0.1,false,b\n3,0.2,true,a\n";
    let err = validate_str(&sample_schema(), csv, ValidateOptions::default()).unwrap_err();
    match err {
        FrameError::SchemaMismatch { column, .. } => assert_eq!(column, "grp"),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn validates_a_csv_file_on_disk() {
    let workspace = TestWorkspace::new();
    let csv = workspace.write(
        "input.csv",
        "id,score,active,grp\n1,0.5,true,a\n2,NA,false,b\n3,1.25,TRUE,a\n",
    );
    validate_csv_file(&sample_schema(), &csv, b',', ValidateOptions::default()).unwrap();
}
