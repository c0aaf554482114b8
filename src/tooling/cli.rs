//! CLI Tooling
//!
//! Command-line surface of the `nsgql` binary: one-shot NsgQL queries, agent
//! exec commands, and offline rendering of saved responses. Every command
//! returns its text output; printing is left to the binary.

use crate::config::{CliConfig, ConfigLoader};
use crate::error::ApiError;
use crate::format::{FormatterConfig, TableFormatter, TableStyle, TimeFormat};
use crate::response::{render_replies, ResponseEnvelope, StatusMode, StreamDecoder, STATUS_OK};
use crate::transport::{ApiClient, Method};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// nsgql - query a NetSpyGlass server from the command line
#[derive(Parser, Debug)]
#[command(name = "nsgql")]
#[command(about = "Run NsgQL queries and agent commands against a NetSpyGlass server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, e.g. http://localhost:9100 or https://nsg-server:9100
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API access token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Network id
    #[arg(short = 'n', long, global = true)]
    pub network: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print time columns in ISO 8601 format in UTC
    #[arg(short = 'U', long, global = true, conflicts_with = "local")]
    pub utc: bool,

    /// Print time columns in ISO 8601 format in the local timezone
    #[arg(short = 'L', long, global = true)]
    pub local: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Execute NsgQL queries; several queries may be separated by ';'
    Query {
        /// How to format the result: list, table, time_series, json
        #[arg(short = 'f', long, default_value = "table",
              value_parser = ["list", "table", "time_series", "json"])]
        format: String,
        /// Print the server response as JSON instead of tables
        #[arg(long)]
        raw: bool,
        /// Table style
        #[arg(long, value_parser = ["plain", "boxed"])]
        style: Option<String>,
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Ask agents to run a command against an address (ping, fping, traceroute)
    Exec {
        /// Command to run on the agents
        #[arg(value_parser = ["ping", "fping", "traceroute"])]
        command: String,
        /// Target address
        address: String,
        /// Restrict to agents in this region
        #[arg(long)]
        region: Option<String>,
        /// Extra arguments passed to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Render a saved server response without contacting the server
    Render {
        /// File holding the response body
        path: PathBuf,
        /// The body is an array streamed one element per line
        #[arg(long)]
        stream: bool,
        /// Render elements as agent replies instead of tables
        #[arg(long)]
        replies: bool,
        /// Print the decoded response as JSON
        #[arg(long)]
        raw: bool,
        /// Table style
        #[arg(long, value_parser = ["plain", "boxed"])]
        style: Option<String>,
    },
}

/// Request body for the query endpoint.
///
/// Queries are split on `;`; blank queries are dropped.
pub fn nsgql_targets(queries: &str, format: &str) -> Value {
    let targets: Vec<Value> = queries
        .split(';')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| json!({"nsgql": q, "format": format}))
        .collect();
    json!({ "targets": targets })
}

/// API path of the query endpoint for a network.
pub fn query_path(network: u32) -> String {
    format!("/v2/query/net/{}/data/", network)
}

/// API path and query parameters of an agent exec call.
pub fn exec_request(
    network: u32,
    command: &str,
    address: &str,
    region: Option<&str>,
    args: &[String],
) -> (String, Value) {
    let mut params = Map::new();
    params.insert("address".to_string(), Value::from(address));
    if let Some(region) = region {
        params.insert("region".to_string(), Value::from(region));
    }
    params.insert("args".to_string(), Value::from(args.join(" ")));
    (
        format!("v2/nsg/cluster/net/{}/exec/{}", network, command),
        Value::Object(params),
    )
}

fn parse_style(style: &str) -> Result<TableStyle, ApiError> {
    match style {
        "plain" => Ok(TableStyle::Plain),
        "boxed" => Ok(TableStyle::Boxed),
        other => Err(ApiError::ConfigError(format!(
            "Invalid table style: {} (must be 'plain' or 'boxed')",
            other
        ))),
    }
}

fn to_json_text(value: &Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Decode(format!("Failed to serialize response: {}", e)))
}

/// CLI context: merged configuration plus command dispatch.
pub struct CliContext {
    config: CliConfig,
}

impl CliContext {
    /// Load configuration and apply command-line overrides on top of it.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self::from_config(config, cli))
    }

    /// Apply command-line overrides to an already loaded configuration.
    pub fn from_config(mut config: CliConfig, cli: &Cli) -> Self {
        if let Some(base_url) = &cli.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(token) = &cli.token {
            config.server.token = Some(token.clone());
        }
        if let Some(network) = cli.network {
            config.server.network = network;
        }
        if let Some(timeout) = cli.timeout {
            config.server.timeout_secs = timeout;
        }
        if cli.utc {
            config.format.time_format = TimeFormat::IsoUtc;
        } else if cli.local {
            config.format.time_format = TimeFormat::IsoLocal;
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &cli.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &cli.log_file {
            config.logging.file = Some(file.clone());
        }
        Self { config }
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Query {
                format,
                raw,
                style,
                query,
            } => self.handle_query(&query.join(" "), format, *raw, style.as_deref()),
            Commands::Exec {
                command,
                address,
                region,
                args,
            } => self.handle_exec(command, address, region.as_deref(), args),
            Commands::Render {
                path,
                stream,
                replies,
                raw,
                style,
            } => self.handle_render(path, *stream, *replies, *raw, style.as_deref()),
        }
    }

    fn formatter(&self, style: Option<&str>) -> Result<TableFormatter, ApiError> {
        let mut config: FormatterConfig = self.config.format.clone();
        if let Some(style) = style {
            config = config.with_style(parse_style(style)?);
        }
        Ok(TableFormatter::new(config))
    }

    fn handle_query(
        &self,
        query: &str,
        format: &str,
        raw: bool,
        style: Option<&str>,
    ) -> Result<String, ApiError> {
        let body = nsgql_targets(query, format);
        let formatter = self.formatter(style)?;
        let client = ApiClient::new(&self.config.server)?;
        info!(network = self.config.server.network, "running nsgql query");

        let response = client.call(
            Method::Post,
            &query_path(self.config.server.network),
            Some(&body),
        )?;
        let payload = response.into_document_envelope().into_result()?;
        if raw || format != "table" {
            return to_json_text(&payload);
        }
        Ok(formatter.render_results(&payload))
    }

    fn handle_exec(
        &self,
        command: &str,
        address: &str,
        region: Option<&str>,
        args: &[String],
    ) -> Result<String, ApiError> {
        let (path, params) =
            exec_request(self.config.server.network, command, address, region, args);
        let mode = if command == "fping" {
            StatusMode::Fping
        } else {
            StatusMode::Generic
        };
        let client = ApiClient::new(&self.config.server)?;
        let response = client.call(Method::Get, &path, Some(&params))?;
        if response.status() != STATUS_OK {
            return response
                .into_stream_envelope()
                .into_result()
                .map(|_| String::new());
        }

        let mut decoder = response.decoder();
        let out = render_replies(decoder.by_ref(), mode);
        let stats = decoder.finish()?;
        debug!(parsed = stats.parsed, malformed = stats.malformed, "exec replies decoded");
        Ok(out)
    }

    fn handle_render(
        &self,
        path: &Path,
        stream: bool,
        replies: bool,
        raw: bool,
        style: Option<&str>,
    ) -> Result<String, ApiError> {
        let formatter = self.formatter(style)?;
        let file = File::open(path)?;

        if replies {
            let mut decoder = StreamDecoder::from_reader(BufReader::new(file));
            let out = render_replies(decoder.by_ref(), StatusMode::Generic);
            decoder.finish()?;
            return Ok(out);
        }

        let envelope = if stream {
            ResponseEnvelope::from_stream(STATUS_OK, BufReader::new(file))
        } else {
            ResponseEnvelope::from_document(STATUS_OK, file)
        };
        let payload = envelope.into_result()?;
        if raw {
            return to_json_text(&payload);
        }
        Ok(formatter.render_results(&payload))
    }
}
