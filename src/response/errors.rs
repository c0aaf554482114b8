//! Best-effort extraction of a readable error message from a response of unknown shape.

use serde_json::{Map, Value};
use std::io::{BufRead, Read};

/// Nesting depth past which extraction gives up.
pub const MAX_ERROR_DEPTH: usize = 32;

const UNPARSEABLE: &str = "unparseable error";

/// Find a human-readable error message in any JSON value. Never fails.
///
/// Objects yield their `error` field (or their JSON text when there is none),
/// arrays defer to their first element, strings are returned verbatim.
pub fn extract_error(value: &Value) -> String {
    extract_at(value, 0)
}

fn extract_at(value: &Value, depth: usize) -> String {
    if depth > MAX_ERROR_DEPTH {
        return UNPARSEABLE.to_string();
    }
    match value {
        Value::Object(map) => match map.get("error") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => value.to_string(),
        },
        Value::Array(items) => match items.first() {
            Some(first) => extract_at(first, depth + 1),
            None => value.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Raw body bytes as UTF-8 text.
pub fn extract_error_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

fn object_error(map: &Map<String, Value>) -> Option<&Value> {
    match map.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(error) => Some(error),
    }
}

/// Error carried by a result, if any. `None` means the result is a success.
///
/// A result is an error when it has a non-empty `error` field or a `status`
/// other than `ok` (case-insensitive). Arrays are judged by their first element.
pub fn find_error(value: &Value) -> Option<String> {
    find_at(value, 0)
}

fn find_at(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_ERROR_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if object_error(map).is_some() {
                return Some(extract_error(value));
            }
            match map.get("status").and_then(Value::as_str) {
                Some(status) if !status.eq_ignore_ascii_case("ok") => Some(extract_error(value)),
                _ => None,
            }
        }
        Value::Array(items) => items.first().and_then(|first| find_at(first, depth + 1)),
        _ => None,
    }
}

/// Upper bound on how much of an error body is read past its first line.
const MAX_ERROR_BODY: u64 = 64 * 1024;

/// Error message from the first meaningful line of an error body.
///
/// Error bodies may be array-per-line JSON, a single JSON document, or plain
/// text. The first non-framing line is tried on its own; when it is not JSON,
/// the body up to [`MAX_ERROR_BODY`] bytes is tried as one document before the
/// line is returned as text.
pub fn first_error_line<R: BufRead>(mut reader: R) -> String {
    let mut consumed = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return "empty error response".to_string(),
            Ok(_) => consumed.extend_from_slice(&line),
            Err(e) => return format!("failed to read error response: {}", e),
        }
        let text = String::from_utf8_lossy(&line);
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "[" || trimmed == "]" {
            continue;
        }
        let element = trimmed.strip_prefix('[').unwrap_or(trimmed);
        if let Ok(value) = serde_json::from_str::<Value>(element) {
            return extract_error(&value);
        }

        // A document spread over several lines, e.g. pretty-printed JSON.
        if reader
            .by_ref()
            .take(MAX_ERROR_BODY)
            .read_to_end(&mut consumed)
            .is_ok()
        {
            if let Ok(value) = serde_json::from_slice::<Value>(&consumed) {
                return extract_error(&value);
            }
        }
        return trimmed.to_string();
    }
}
