//! Tabular rendering of `{columns, rows}` query responses.

use super::value::ValueTransformer;
use super::{FormatterConfig, TableStyle};
use crate::response::errors::find_error;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

const CELL_DIVIDER: &str = " | ";
const HEADER_DIVIDER: &str = "-+-";

/// Contract violations in a table response.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("row {row} has {actual} cells but the table has {expected} columns")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed table response: {0}")]
    Shape(String),
}

#[derive(Debug, Clone, Deserialize)]
struct Column {
    text: String,
}

/// Server metadata reported with a table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub server: Option<Value>,
    #[serde(default)]
    pub query_id: Option<Value>,
}

/// A decoded `{columns, rows}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    #[serde(deserialize_with = "column_names")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub meta: TableMeta,
}

fn column_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let columns = Vec::<Column>::deserialize(deserializer)?;
    Ok(columns.into_iter().map(|c| c.text).collect())
}

impl TableSpec {
    /// Read a table out of a response value. `Ok(None)` when there is no `columns` key.
    pub fn from_response(response: &Value) -> Result<Option<TableSpec>, FormatError> {
        if response.get("columns").is_none() {
            return Ok(None);
        }
        TableSpec::deserialize(response)
            .map(Some)
            .map_err(|e| FormatError::Shape(e.to_string()))
    }

    fn check_rows(&self) -> Result<(), FormatError> {
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(FormatError::RowLength {
                    row: idx,
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }
}

/// Seconds in the shortest form that round-trips, keeping one decimal for whole numbers.
fn seconds_display(ms: f64) -> String {
    let secs = ms / 1000.0;
    if secs.is_finite() && secs.fract() == 0.0 {
        format!("{:.1}", secs)
    } else {
        secs.to_string()
    }
}

/// Whether a metadata value counts as set: not null and not an empty string.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn meta_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders query responses as aligned text tables.
#[derive(Debug, Clone, Default)]
pub struct TableFormatter {
    transformer: ValueTransformer,
}

impl TableFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            transformer: ValueTransformer::new(config),
        }
    }

    pub fn transformer(&self) -> &ValueTransformer {
        &self.transformer
    }

    /// Render one response. A response without `columns` renders as an empty string.
    pub fn render(&self, response: &Value) -> Result<String, FormatError> {
        match TableSpec::from_response(response)? {
            Some(spec) => self.render_table(&spec),
            None => Ok(String::new()),
        }
    }

    /// Render the array of per-query results returned by the query endpoint.
    ///
    /// Results carrying an error become `Server error: ...` lines and results
    /// that break the table contract become `Format error: ...` lines; the rest
    /// are rendered as tables in order.
    pub fn render_results(&self, results: &Value) -> String {
        let items = match results {
            Value::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        let mut out = String::new();
        for item in items {
            if let Some(error) = find_error(item) {
                out.push_str(&format!("Server error: {}\n", error));
                continue;
            }
            match self.render(item) {
                Ok(table) => out.push_str(&table),
                Err(e) => {
                    warn!(error = %e, "skipping result that cannot be rendered");
                    out.push_str(&format!("Format error: {}\n", e));
                }
            }
        }
        out
    }

    pub fn render_table(&self, spec: &TableSpec) -> Result<String, FormatError> {
        spec.check_rows()?;

        let titles: Vec<String> = spec
            .columns
            .iter()
            .map(|c| self.transformer.transform_column_title(c))
            .collect();
        let cells: Vec<Vec<String>> = spec
            .rows
            .iter()
            .map(|row| {
                spec.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| self.transformer.transform_value(column, value))
                    .collect()
            })
            .collect();

        let mut out = match self.transformer.config().style {
            TableStyle::Plain => Self::layout_plain(&titles, &cells),
            TableStyle::Boxed => Self::layout_boxed(&titles, &cells),
        };
        out.push_str(&Self::summary(spec));
        out.push('\n');
        Ok(out)
    }

    fn column_widths(titles: &[String], cells: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = titles.iter().map(|t| t.chars().count()).collect();
        for row in cells {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }
        widths
    }

    fn layout_plain(titles: &[String], cells: &[Vec<String>]) -> String {
        if titles.is_empty() {
            return String::new();
        }
        let widths = Self::column_widths(titles, cells);
        let pad_row = |row: &[String]| -> String {
            row.iter()
                .zip(&widths)
                .map(|(text, width)| format!("{:<width$}", text, width = *width))
                .collect::<Vec<_>>()
                .join(CELL_DIVIDER)
        };
        let separator = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(HEADER_DIVIDER);

        let mut out = String::new();
        out.push_str(&pad_row(titles));
        out.push('\n');
        out.push_str(&separator);
        out.push('\n');
        for row in cells {
            out.push_str(&pad_row(row));
            out.push('\n');
        }
        out.push_str(&separator);
        out.push('\n');
        out
    }

    fn layout_boxed(titles: &[String], cells: &[Vec<String>]) -> String {
        if titles.is_empty() {
            return String::new();
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(titles.to_vec());
        for row in cells {
            table.add_row(row.clone());
        }
        format!("{}\n", table)
    }

    fn summary(spec: &TableSpec) -> String {
        let mut line = format!("Count: {}", spec.rows.len());
        if let Some(server) = spec.meta.server.as_ref().filter(|s| is_present(s)) {
            let query_id = spec
                .meta
                .query_id
                .as_ref()
                .map(meta_display)
                .unwrap_or_else(|| "0".to_string());
            line.push_str(&format!(
                ", served by: {}, processing time: {} sec; query id: {}",
                meta_display(server),
                seconds_display(spec.meta.processing_time_ms.unwrap_or(0.0)),
                query_id
            ));
        }
        line
    }
}
