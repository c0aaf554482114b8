use clap::Parser;
use serde_json::json;
use nsgcli::config::{global_config_path, ConfigLoader};
use nsgcli::format::{TableFormatter, TableStyle, TimeFormat};
use nsgcli::tooling::cli::{Cli, CliContext};
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with XDG_CONFIG_HOME pointed at `home` and the given variables set.
fn with_env<F: FnOnce()>(home: &TempDir, vars: &[(&str, &str)], f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let previous = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", home.path());
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, _) in vars {
        std::env::remove_var(key);
    }
    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

fn write_global(home: &TempDir, contents: &str) {
    let dir = home.path().join("nsgcli");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn defaults_without_any_file() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[], || {
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.server.base_url, "http://localhost:9100");
        assert_eq!(config.server.network, 1);
        assert_eq!(config.server.timeout_secs, 180);
        assert_eq!(config.server.token, None);
        assert_eq!(config.format.time_format, TimeFormat::Ms);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.output, "stderr");
    });
}

#[test]
fn global_file_is_picked_up_from_xdg_config_home() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[], || {
        assert!(global_config_path().unwrap().starts_with(home.path()));
        write_global(
            &home,
            "[server]\nbase_url = \"https://global:9100\"\ntoken = \"abc\"\n",
        );
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.server.base_url, "https://global:9100");
        assert_eq!(config.server.token.as_deref(), Some("abc"));
    });
}

#[test]
fn explicit_file_overrides_global_file() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[], || {
        write_global(&home, "[server]\nnetwork = 2\n\n[format]\nstyle = \"boxed\"\n");
        let explicit = home.path().join("team.toml");
        fs::write(&explicit, "[server]\nnetwork = 4\n").unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        assert_eq!(config.server.network, 4);
        assert_eq!(config.format.style, TableStyle::Boxed);
    });
}

#[test]
fn environment_overrides_files() {
    let home = TempDir::new().unwrap();
    with_env(
        &home,
        &[
            ("NSGCLI__SERVER__NETWORK", "9"),
            ("NSGCLI__FORMAT__TIME_FORMAT", "iso_local"),
        ],
        || {
            write_global(&home, "[server]\nnetwork = 2\n");
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.server.network, 9);
            assert_eq!(config.format.time_format, TimeFormat::IsoLocal);
        },
    );
}

#[test]
fn cli_flags_override_environment() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[("NSGCLI__SERVER__NETWORK", "9")], || {
        let cli = Cli::try_parse_from(["nsgql", "--network", "12", "--utc", "query", "SHOW tables"])
            .unwrap();
        let ctx = CliContext::new(&cli).unwrap();
        assert_eq!(ctx.config().server.network, 12);
        assert_eq!(ctx.config().format.time_format, TimeFormat::IsoUtc);
    });
}

#[test]
fn camel_case_renames_from_both_files_render_in_tables() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[], || {
        write_global(
            &home,
            "[format.column_titles]\ncpuUsage = \"CPU\"\nupdatedAt = \"Seen\"\n",
        );
        let explicit = home.path().join("team.toml");
        fs::write(&explicit, "[format.column_titles]\nupdatedAt = \"Updated\"\n").unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        let formatter = TableFormatter::new(config.format);
        let out = formatter
            .render(&json!({
                "columns": [{"text": "cpuUsage"}, {"text": "updatedAt"}],
                "rows": [[42.5, 1]]
            }))
            .unwrap();
        assert!(out.starts_with("CPU     | Updated\n"), "unexpected header in\n{out}");
    });
}

#[test]
fn invalid_time_format_is_config_error() {
    let home = TempDir::new().unwrap();
    with_env(&home, &[], || {
        write_global(&home, "[format]\ntime_format = \"fortnights\"\n");
        let err = ConfigLoader::load().unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    });
}
