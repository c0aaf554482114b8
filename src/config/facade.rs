//! ConfigLoader facade delegating to the merge service.

use super::merge::MergeService;
use super::CliConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<CliConfig, ApiError> {
        MergeService::load(None)
    }

    /// Load configuration with an explicit file layered over the global one.
    pub fn load_from_file(path: &Path) -> Result<CliConfig, ApiError> {
        MergeService::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> CliConfig {
        CliConfig::default()
    }
}
