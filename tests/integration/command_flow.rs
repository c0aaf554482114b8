use clap::Parser;
use nsgcli::config::CliConfig;
use nsgcli::error::ApiError;
use nsgcli::tooling::cli::{Cli, CliContext};

use crate::integration::http_stub::StubServer;

fn run(args: &[&str]) -> Result<String, ApiError> {
    let cli = Cli::try_parse_from(args).unwrap();
    CliContext::from_config(CliConfig::default(), &cli).execute(&cli.command)
}

#[test]
fn query_posts_targets_and_renders_tables() {
    let body = r#"[{"columns":[{"text":"device"},{"text":"cpuUsage"}],"rows":[["host1",42.5]],
"processingTimeMs":12,"server":"srv1","queryId":"q1"},{"error":"unknown table"}]"#;
    let server = StubServer::respond("200 OK", body);

    let out = run(&[
        "nsgql",
        "--base-url",
        &server.base_url,
        "--token",
        "t0k",
        "-n",
        "3",
        "query",
        "SELECT device, cpuUsage FROM devices; SHOW nothing",
    ])
    .unwrap();
    assert!(out.contains("device | cpuUsage"));
    assert!(out.contains("host1  | 42.50 %"));
    assert!(out.contains("Count: 1, served by: srv1, processing time: 0.012 sec; query id: q1"));
    assert!(out.contains("Server error: unknown table"));

    let request = server.request();
    assert!(request.starts_with("POST /v2/query/net/3/data/ HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("x-nsg-auth-api-token: t0k"));
    let json_start = request.find("\r\n\r\n").unwrap() + 4;
    let sent: serde_json::Value = serde_json::from_str(&request[json_start..]).unwrap();
    assert_eq!(sent["targets"][0]["nsgql"], "SELECT device, cpuUsage FROM devices");
    assert_eq!(sent["targets"][1]["nsgql"], "SHOW nothing");
    assert_eq!(sent["targets"][1]["format"], "table");
}

#[test]
fn query_failure_status_is_status_error() {
    let server = StubServer::respond("400 Bad Request", r#"{"error":"syntax error at FROM"}"#);
    let err = run(&["nsgql", "--base-url", &server.base_url, "query", "SELECT FROM"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "An error occurred. Error: syntax error at FROM, API status code: 400"
    );
    server.request();
}

#[test]
fn exec_gets_with_params_and_renders_replies() {
    let body = "[{\"agent\":\"a1\",\"agentAddress\":\"10.0.0.1\",\"response\":[\"10.1.1.1 is unreachable\"],\"exitStatus\":1}\n]\n";
    let server = StubServer::respond("200 OK", body);

    let out = run(&[
        "nsgql",
        "--base-url",
        &server.base_url,
        "exec",
        "fping",
        "10.1.1.1",
        "--region",
        "world",
        "-c",
        "3",
    ])
    .unwrap();
    assert_eq!(
        out,
        "\nSource: a1 (10.0.0.1)\nStatus: some hosts were unreachable\nOutput: \n10.1.1.1 is unreachable\n"
    );

    let request = server.request();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /v2/nsg/cluster/net/1/exec/fping?"));
    assert!(request_line.contains("address=10.1.1.1"));
    assert!(request_line.contains("region=world"));
    assert!(request_line.contains("args=-c+3"));
}

#[test]
fn exec_failure_status_is_status_error() {
    let server = StubServer::respond("503 Service Unavailable", "[{\"error\":\"no agents\"}\n]\n");
    let err = run(&["nsgql", "--base-url", &server.base_url, "exec", "ping", "10.1.1.1"]).unwrap_err();
    assert!(matches!(err, ApiError::Status { code: 503, ref message } if message == "no agents"));
    server.request();
}
