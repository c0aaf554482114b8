//! MergeService: orchestrates sources, applies defaults, deserializes to CliConfig.

use crate::config::paths::global_config_path;
use crate::config::sources::{column_titles, environment, global_file};
use crate::config::CliConfig;
use crate::error::ApiError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};

/// Built-in values below every other source.
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.base_url", "http://localhost:9100")?
        .set_default("server.network", 1)?
        .set_default("server.timeout_secs", 180)?
        .set_default("format.time_format", "ms")?
        .set_default("logging.level", "warn")?
        .set_default("logging.output", "stderr")
}

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit_file: Option<&Path>) -> Result<CliConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApiError::ConfigError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                builder.add_source(File::from(path).required(true))
            }
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        let mut config: CliConfig = config.try_deserialize()?;

        let mut files: Vec<PathBuf> = global_config_path().into_iter().collect();
        files.extend(explicit_file.map(Path::to_path_buf));
        column_titles::restore_case(
            &mut config.format.column_titles,
            files.iter().map(PathBuf::as_path),
        )?;
        Ok(config)
    }
}
