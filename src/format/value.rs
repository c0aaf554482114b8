//! Per-field value transforms and column title rendering.

use super::field::FieldClass;
use super::{FormatterConfig, TimeFormat};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

const MEMORY_UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];
const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Scale a byte count with binary prefixes, e.g. `1.500 MiB`. Zero renders empty.
pub fn sizeof_fmt(num: f64) -> String {
    if num == 0.0 || !num.is_finite() {
        return String::new();
    }
    let mut num = num;
    for unit in MEMORY_UNITS {
        if num.abs() < 1024.0 {
            return format!("{:.3} {}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.3} YiB", num)
}

pub fn percentage_fmt(num: f64) -> String {
    format!("{:.2} %", num)
}

/// Render seconds as `H:MM:SS`, prefixed by `N day(s), ` when at least a day
/// and suffixed by `.ffffff` when there is a sub-second part.
pub fn duration_fmt(seconds: f64) -> String {
    let total_us = (seconds * 1_000_000.0).round() as i64;
    let days = total_us.div_euclid(MICROS_PER_DAY);
    let rem = total_us.rem_euclid(MICROS_PER_DAY);
    let secs = rem / 1_000_000;
    let micros = rem % 1_000_000;

    let mut out = String::new();
    if days != 0 {
        let plural = if days.abs() == 1 { "" } else { "s" };
        out.push_str(&format!("{} day{}, ", days, plural));
    }
    out.push_str(&format!(
        "{}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    ));
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

fn iso_fmt(dt: NaiveDateTime) -> String {
    if dt.and_utc().timestamp_subsec_micros() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn from_epoch_micros(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    // Timestamps without an offset are taken as UTC.
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Plain display: `NULL` for null, trailing whitespace stripped from strings,
/// compact JSON for arrays and objects.
fn plain(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.trim_end().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Maps raw field values and column names to display text.
#[derive(Debug, Clone, Default)]
pub struct ValueTransformer {
    config: FormatterConfig,
}

impl ValueTransformer {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Apply the configured rename, if any.
    pub fn map_column_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.config
            .column_titles
            .get(column)
            .map(String::as_str)
            .unwrap_or(column)
    }

    /// Display title for a raw column name. Time columns carry the timezone suffix.
    pub fn transform_column_title(&self, column: &str) -> String {
        let title = self.map_column_name(column);
        if FieldClass::of(column).is_time() {
            format!("{}{}", title, self.config.time_format.title_suffix())
        } else {
            title.to_string()
        }
    }

    /// Display text for a value of the named field.
    pub fn transform_value(&self, field_name: &str, value: &Value) -> String {
        match value {
            Value::String(s) if s == "*" => return s.clone(),
            Value::Null => return "NULL".to_string(),
            Value::String(s) if s == "NULL" => return "NULL".to_string(),
            _ => {}
        }

        let class = FieldClass::of(field_name);
        let rendered = match class {
            FieldClass::Plain | FieldClass::Boolean => None,
            FieldClass::EpochMillisTime => self.epoch_millis(value),
            FieldClass::Iso8601Time => self.iso8601(value),
            FieldClass::Duration => as_number(value).map(duration_fmt),
            FieldClass::MemoryBytes => self.memory(value),
            // Zero stays a bare number.
            FieldClass::Percentage => match value {
                Value::Number(n) => n.as_f64().filter(|x| *x != 0.0).map(percentage_fmt),
                _ => None,
            },
        };

        rendered.unwrap_or_else(|| {
            if class != FieldClass::Plain && !self.passes_through(class, value) {
                debug!(
                    field = field_name,
                    value = %value,
                    "value does not fit its field class, rendering as-is"
                );
            }
            plain(value)
        })
    }

    /// Values that are expected to render plainly even though the field has a class.
    fn passes_through(&self, class: FieldClass, value: &Value) -> bool {
        match class {
            FieldClass::Boolean => true,
            FieldClass::Percentage => {
                value.is_string() || value.as_f64().map_or(false, |x| x == 0.0)
            }
            FieldClass::EpochMillisTime | FieldClass::Iso8601Time => {
                self.config.time_format == TimeFormat::Ms
            }
            _ => false,
        }
    }

    fn epoch_millis(&self, value: &Value) -> Option<String> {
        if self.config.time_format == TimeFormat::Ms {
            return None;
        }
        let millis = as_number(value)?;
        let dt = from_epoch_micros((millis * 1_000.0).round() as i64)?;
        Some(self.render_time(dt))
    }

    fn iso8601(&self, value: &Value) -> Option<String> {
        if self.config.time_format == TimeFormat::Ms {
            return None;
        }
        let dt = parse_iso8601(value.as_str()?)?;
        Some(self.render_time(dt))
    }

    fn render_time(&self, dt: DateTime<Utc>) -> String {
        match self.config.time_format {
            TimeFormat::IsoLocal => iso_fmt(dt.with_timezone(&Local).naive_local()),
            _ => iso_fmt(dt.naive_utc()),
        }
    }

    fn memory(&self, value: &Value) -> Option<String> {
        match value {
            Value::Bool(false) => Some(String::new()),
            Value::String(s) if s.trim().is_empty() => Some(String::new()),
            _ => as_number(value).map(sizeof_fmt),
        }
    }
}
