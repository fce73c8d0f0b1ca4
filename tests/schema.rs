mod common;

use std::str::FromStr;

use common::TestWorkspace;
use framenode::error::FrameError;
use framenode::schema::{ColumnKind, ColumnSchema, StringFormat, TableSchema};

fn sample_schema() -> TableSchema {
    TableSchema::new(
        vec![
            ColumnSchema::new("id", ColumnKind::Integer),
            ColumnSchema::string_with_format("day", StringFormat::Date),
            ColumnSchema::factor("grp", vec!["a".to_string(), "b".to_string()], true),
        ],
        10,
        true,
    )
}

#[test]
fn schema_round_trips_through_yaml_files() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("schema.yaml");
    let schema = sample_schema();
    schema.save(&path).unwrap();
    let loaded = TableSchema::load(&path).unwrap();
    assert_eq!(loaded, schema);
}

#[test]
fn yaml_output_omits_default_fields() {
    let schema = TableSchema::new(vec![ColumnSchema::new("id", ColumnKind::Integer)], 1, false);
    let yaml = schema.to_yaml_string().unwrap();
    assert!(yaml.contains("kind: integer"));
    assert!(!yaml.contains("format"));
    assert!(!yaml.contains("levels"));
    assert!(!yaml.contains("ordered"));
}

#[test]
fn loading_rejects_malformed_yaml() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.yaml", "columns: [not a schema");
    let err = TableSchema::load(&path).unwrap_err();
    assert!(matches!(err, FrameError::InvalidSchema(_)));
}

#[test]
fn duplicate_column_names_are_invalid() {
    let schema = TableSchema::new(
        vec![
            ColumnSchema::new("id", ColumnKind::Integer),
            ColumnSchema::new("id", ColumnKind::String),
        ],
        1,
        false,
    );
    let err = schema.validate().unwrap_err();
    assert!(matches!(err, FrameError::InvalidSchema(_)));
}

#[test]
fn string_formats_are_only_valid_on_string_columns() {
    let mut column = ColumnSchema::new("id", ColumnKind::Integer);
    column.format = StringFormat::Date;
    let schema = TableSchema::new(vec![column], 1, false);
    assert!(matches!(
        schema.validate(),
        Err(FrameError::InvalidSchema(_))
    ));
}

#[test]
fn levels_are_only_valid_on_factor_columns() {
    let mut column = ColumnSchema::new("id", ColumnKind::Integer);
    column.levels = vec!["a".to_string()];
    let schema = TableSchema::new(vec![column], 1, false);
    assert!(matches!(
        schema.validate(),
        Err(FrameError::InvalidSchema(_))
    ));
}

#[test]
fn factor_levels_must_be_unique_and_present_when_ordered() {
    let schema = TableSchema::new(
        vec![ColumnSchema::factor(
            "grp",
            vec!["a".to_string(), "a".to_string()],
            false,
        )],
        1,
        false,
    );
    assert!(matches!(
        schema.validate(),
        Err(FrameError::InvalidSchema(_))
    ));

    let schema = TableSchema::new(
        vec![ColumnSchema::factor("grp", Vec::new(), true)],
        1,
        false,
    );
    assert!(matches!(
        schema.validate(),
        Err(FrameError::InvalidSchema(_))
    ));
}

#[test]
fn template_produces_string_columns() {
    let headers = vec!["a".to_string(), "b".to_string()];
    let schema = TableSchema::template(&headers, 5, false);
    assert_eq!(schema.row_count, 5);
    assert_eq!(schema.column_names(), headers);
    assert!(
        schema
            .columns
            .iter()
            .all(|c| c.kind == ColumnKind::String)
    );
}

#[test]
fn column_kind_parses_common_aliases() {
    assert_eq!(ColumnKind::from_str("int").unwrap(), ColumnKind::Integer);
    assert_eq!(ColumnKind::from_str("double").unwrap(), ColumnKind::Number);
    assert_eq!(ColumnKind::from_str("Bool").unwrap(), ColumnKind::Boolean);
    assert!(ColumnKind::from_str("complex").is_err());
}
