//! The `{ok, payload | error}` result of one API call.

use super::decoder::StreamDecoder;
use super::errors::{extract_error, extract_error_bytes, first_error_line};
use crate::error::ApiError;
use serde_json::Value;
use std::io::{BufRead, Read};

/// HTTP status the server uses for success.
pub const STATUS_OK: u16 = 200;

/// Outcome of one API call, built once and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    status: u16,
    ok: bool,
    payload: Option<Value>,
    error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(status: u16, payload: Value) -> Self {
        Self {
            status,
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            ok: false,
            payload: None,
            error: Some(error.into()),
        }
    }

    /// Build from an array-per-line body.
    ///
    /// On success the payload is the array of decoded elements. On a failure
    /// status only the first line of the body is read.
    pub fn from_stream<R: BufRead>(status: u16, body: R) -> Self {
        if status != STATUS_OK {
            return Self::failure(status, first_error_line(body));
        }
        let mut decoder = StreamDecoder::from_reader(body);
        let values: Vec<Value> = decoder.by_ref().collect();
        match decoder.finish() {
            Ok(_) => Self::success(status, Value::Array(values)),
            Err(e) => Self::failure(status, e.to_string()),
        }
    }

    /// Build from a body holding a single JSON document.
    pub fn from_document<R: Read>(status: u16, mut body: R) -> Self {
        let mut bytes = Vec::new();
        if let Err(e) = body.read_to_end(&mut bytes) {
            return Self::failure(status, format!("failed to read response: {}", e));
        }
        let parsed = serde_json::from_slice::<Value>(&bytes);
        match (status == STATUS_OK, parsed) {
            (true, Ok(value)) => Self::success(status, value),
            (true, Err(e)) => Self::failure(
                status,
                format!(
                    "Unable to decode response data to json. Input data: {}, Error: {}",
                    extract_error_bytes(&bytes),
                    e
                ),
            ),
            (false, Ok(value)) => Self::failure(status, extract_error(&value)),
            (false, Err(_)) => Self::failure(status, extract_error_bytes(&bytes)),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Payload on success; [`ApiError::Status`] carrying the message otherwise.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.ok {
            return Ok(self.payload.unwrap_or(Value::Null));
        }
        Err(ApiError::Status {
            code: self.status,
            message: self.error.unwrap_or_default(),
        })
    }
}
