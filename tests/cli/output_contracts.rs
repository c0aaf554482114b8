use std::fs;

use clap::Parser;
use nsgcli::config::CliConfig;
use nsgcli::error::ApiError;
use nsgcli::tooling::cli::{nsgql_targets, Cli, CliContext};
use serde_json::Value;
use tempfile::TempDir;

const TABLE_DOCUMENT: &str = r#"[{"columns":[{"text":"device"},{"text":"cpuUsage"},{"text":"updatedAt"}],
"rows":[["host1",42.5,1700000000000]],"processingTimeMs":12,"server":"srv1","queryId":"q1"}]"#;

fn run(args: &[&str]) -> Result<String, ApiError> {
    let cli = Cli::try_parse_from(args).unwrap();
    CliContext::from_config(CliConfig::default(), &cli).execute(&cli.command)
}

fn saved(temp: &TempDir, name: &str, body: &str) -> String {
    let path = temp.path().join(name);
    fs::write(&path, body).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn table_output_contract() {
    let temp = TempDir::new().unwrap();
    let path = saved(&temp, "table.json", TABLE_DOCUMENT);

    let out = run(&["nsgql", "render", &path]).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "device | cpuUsage | updatedAt    ");
    assert_eq!(lines[1], "-------+----------+--------------");
    assert_eq!(lines[2], "host1  | 42.50 %  | 1700000000000");
    assert_eq!(lines[3], lines[1]);
    assert_eq!(
        lines[4],
        "Count: 1, served by: srv1, processing time: 0.012 sec; query id: q1"
    );
}

#[test]
fn utc_flag_changes_title_and_cells() {
    let temp = TempDir::new().unwrap();
    let path = saved(&temp, "table.json", TABLE_DOCUMENT);

    let out = run(&["nsgql", "--utc", "render", &path]).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].ends_with("updatedAt (utc)    "));
    assert!(lines[2].ends_with("2023-11-14 22:13:20"));
}

#[test]
fn raw_output_is_valid_json() {
    let temp = TempDir::new().unwrap();
    let path = saved(&temp, "table.json", TABLE_DOCUMENT);

    let out = run(&["nsgql", "render", "--raw", &path]).unwrap();
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["server"], "srv1");
    assert_eq!(parsed[0]["rows"][0][0], "host1");
}

#[test]
fn boxed_output_keeps_cells_and_summary() {
    let temp = TempDir::new().unwrap();
    let path = saved(&temp, "table.json", TABLE_DOCUMENT);

    let out = run(&["nsgql", "render", "--style", "boxed", &path]).unwrap();
    assert!(out.contains("device"));
    assert!(out.contains("42.50 %"));
    assert!(out.contains("Count: 1, served by: srv1"));
    assert!(!out.contains(" | "));
}

#[test]
fn streamed_body_renders_like_a_document() {
    let temp = TempDir::new().unwrap();
    let document = saved(&temp, "doc.json", TABLE_DOCUMENT);
    let single_line = TABLE_DOCUMENT.replace('\n', "");
    let stream_body = format!("{}\n]\n", single_line.trim_end_matches(']'));
    let stream = saved(&temp, "stream.json", &stream_body);

    let from_document = run(&["nsgql", "render", &document]).unwrap();
    let from_stream = run(&["nsgql", "render", "--stream", &stream]).unwrap();
    assert_eq!(from_document, from_stream);
}

#[test]
fn undecodable_saved_body_is_a_status_error() {
    let temp = TempDir::new().unwrap();
    let path = saved(&temp, "broken.json", "{not json");

    let err = run(&["nsgql", "render", &path]).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("An error occurred. Error: Unable to decode response data to json"));
    assert!(text.ends_with("API status code: 200"));
}

#[test]
fn query_body_contract() {
    let body = nsgql_targets("SHOW tables; SELECT device FROM devices", "table");
    let targets = body["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 2);
    for target in targets {
        assert!(target.get("nsgql").and_then(|v| v.as_str()).is_some());
        assert_eq!(target["format"], "table");
    }
}
