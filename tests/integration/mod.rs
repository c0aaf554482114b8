//! Integration tests for the nsgcli decode and format layer

mod command_flow;
mod config_loader;
mod envelope_flow;
