mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use framenode::schema::{ColumnKind, TableSchema};
use predicates::str::contains;

const SCHEMA_YAML: &str = "\
columns:
- name: id
  kind: integer
- name: grp
  kind: factor
  levels:
  - a
  - b
row_count: 2
";

#[test]
fn verify_accepts_a_matching_file() {
    let workspace = TestWorkspace::new();
    let schema = workspace.write("schema.yaml", SCHEMA_YAML);
    let csv = workspace.write("input.csv", "id,grp\n1,a\n2,b\n");
    Command::cargo_bin("framenode")
        .expect("binary exists")
        .args([
            "verify",
            "-s",
            schema.to_str().unwrap(),
            "-i",
            csv.to_str().unwrap(),
        ])
        .assert()
        .success();
}

#[test]
fn verify_rejects_an_undeclared_level() {
    let workspace = TestWorkspace::new();
    let schema = workspace.write("schema.yaml", SCHEMA_YAML);
    let csv = workspace.write("input.csv", "id,grp\n1,a\n2,zzz\n");
    Command::cargo_bin("framenode")
        .expect("binary exists")
        .args([
            "verify",
            "-s",
            schema.to_str().unwrap(),
            "-i",
            csv.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("zzz"));
}

#[test]
fn verify_checks_every_input_in_turn() {
    let workspace = TestWorkspace::new();
    let schema = workspace.write("schema.yaml", SCHEMA_YAML);
    let good = workspace.write("good.csv", "id,grp\n1,a\n2,b\n");
    let short = workspace.write("short.csv", "id,grp\n1,a\n");
    Command::cargo_bin("framenode")
        .expect("binary exists")
        .args([
            "verify",
            "-s",
            schema.to_str().unwrap(),
            "-i",
            good.to_str().unwrap(),
            "-i",
            short.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("short.csv"));
}

#[test]
fn verify_supports_parallel_validation() {
    let workspace = TestWorkspace::new();
    let schema = workspace.write("schema.yaml", SCHEMA_YAML);
    let csv = workspace.write("input.csv", "id,grp\n1,a\n2,b\n");
    Command::cargo_bin("framenode")
        .expect("binary exists")
        .args([
            "verify",
            "-s",
            schema.to_str().unwrap(),
            "-i",
            csv.to_str().unwrap(),
            "--parallel",
            "--chunk-rows",
            "1",
        ])
        .assert()
        .success();
}

#[test]
fn template_writes_a_loadable_schema() {
    let workspace = TestWorkspace::new();
    let csv = workspace.write("input.csv", "id;grp\n1;a\n2;b\n3;b\n");
    let schema_path = workspace.path().join("schema.yaml");
    Command::cargo_bin("framenode")
        .expect("binary exists")
        .args([
            "template",
            "-i",
            csv.to_str().unwrap(),
            "-s",
            schema_path.to_str().unwrap(),
            "--delimiter",
            ";",
        ])
        .assert()
        .success();

    let schema = TableSchema::load(&schema_path).expect("load templated schema");
    assert_eq!(schema.row_count, 3);
    assert_eq!(schema.column_names(), vec!["id", "grp"]);
    assert!(schema.columns.iter().all(|c| c.kind == ColumnKind::String));
}
