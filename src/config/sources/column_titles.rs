//! Column renames read straight from the TOML files.
//!
//! The `config` crate lowercases table keys, which would turn `updatedAt` into
//! `updatedat`. Rename keys are field names and must keep their case, so the
//! `[format.column_titles]` tables are re-read here with `toml`.

use crate::error::ApiError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct RawFile {
    #[serde(default)]
    format: RawFormat,
}

#[derive(Debug, Default, Deserialize)]
struct RawFormat {
    #[serde(default)]
    column_titles: HashMap<String, String>,
}

/// Renames from one file. Missing files and non-TOML files contribute nothing.
pub fn read(path: &Path) -> Result<HashMap<String, String>, ApiError> {
    if path.extension() != Some(std::ffi::OsStr::new("toml")) || !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    let raw: RawFile = toml::from_str(&content).map_err(|e| {
        ApiError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    Ok(raw.format.column_titles)
}

/// Replace lowercased keys in `merged` with their case-preserved spelling from `files`.
///
/// Later files win. Keys only supplied through the environment stay as they are.
pub fn restore_case<'a, I>(merged: &mut HashMap<String, String>, files: I) -> Result<(), ApiError>
where
    I: IntoIterator<Item = &'a Path>,
{
    for path in files {
        for (name, title) in read(path)? {
            merged.remove(&name.to_lowercase());
            merged.insert(name, title);
        }
    }
    Ok(())
}
