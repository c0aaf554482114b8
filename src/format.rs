//! Response formatting: field classification, value transforms, and table rendering.
//!
//! Formatting is driven by an immutable [`FormatterConfig`] supplied at
//! construction; nothing here mutates shared state.

mod field;
mod table;
mod value;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use field::FieldClass;
pub use table::{FormatError, TableFormatter, TableMeta, TableSpec};
pub use value::{duration_fmt, percentage_fmt, sizeof_fmt, ValueTransformer};

/// How epoch and ISO-8601 time columns are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// Raw milliseconds, as sent by the server.
    #[default]
    Ms,
    /// ISO-8601 in UTC, column titles suffixed with ` (utc)`.
    IsoUtc,
    /// ISO-8601 in the local timezone, column titles suffixed with ` (local)`.
    IsoLocal,
}

impl TimeFormat {
    /// Suffix appended to time column titles.
    pub fn title_suffix(self) -> &'static str {
        match self {
            TimeFormat::Ms => "",
            TimeFormat::IsoUtc => " (utc)",
            TimeFormat::IsoLocal => " (local)",
        }
    }
}

/// Table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStyle {
    /// ` | ` cell divider with `-+-` dashed separators.
    #[default]
    Plain,
    /// Unicode box borders.
    Boxed,
}

/// Formatting options threaded into the transformer and table formatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatterConfig {
    #[serde(default)]
    pub time_format: TimeFormat,

    /// Optional renames applied to column titles (raw name -> display name).
    #[serde(default)]
    pub column_titles: HashMap<String, String>,

    #[serde(default)]
    pub style: TableStyle,
}

impl FormatterConfig {
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }
}
