//! Decoder for JSON arrays streamed one element per line.
//!
//! The server writes `[` glued to the first element, one JSON value per line,
//! and a closing `]` on its own line:
//!
//! ```text
//! [{"agent":"a1","response":["ok"],"exitStatus":0}
//! {"agent":"a2","response":["ok"],"exitStatus":0}
//! ]
//! ```
//!
//! [`StreamDecoder`] pulls one line at a time, so a caller that stops early
//! never reads the rest of the body.

use crate::error::ApiError;
use serde_json::Value;
use std::io::{self, BufRead};
use tracing::warn;

/// Lines of a reader, decoded as UTF-8 with invalid sequences replaced.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Counters for a decode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Lines decoded into a value.
    pub parsed: usize,
    /// Data lines that were not valid JSON.
    pub malformed: usize,
}

/// Strip framing from one line. `None` for lines that carry no element.
fn element_text(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "[" || trimmed == "]" {
        return None;
    }
    Some(trimmed.strip_prefix('[').unwrap_or(trimmed))
}

/// Lazy, forward-only decoder over a line stream.
pub struct StreamDecoder<I> {
    lines: I,
    stats: DecodeStats,
    io_error: Option<io::Error>,
}

impl<R: BufRead> StreamDecoder<LossyLines<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(LossyLines::new(reader))
    }
}

impl<I> StreamDecoder<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            stats: DecodeStats::default(),
            io_error: None,
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Consume the decoder and report how the pass went.
    ///
    /// Fails if reading the stream failed, or if there were data lines and
    /// none of them decoded.
    pub fn finish(self) -> Result<DecodeStats, ApiError> {
        if let Some(e) = self.io_error {
            return Err(ApiError::Io(e));
        }
        if self.stats.parsed == 0 && self.stats.malformed > 0 {
            return Err(ApiError::Decode(format!(
                "none of {} response lines could be decoded",
                self.stats.malformed
            )));
        }
        Ok(self.stats)
    }
}

impl<I> Iterator for StreamDecoder<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.io_error.is_some() {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "response stream read failed");
                    self.io_error = Some(e);
                    return None;
                }
            };
            let Some(text) = element_text(&line) else {
                continue;
            };
            match serde_json::from_str::<Value>(text) {
                Ok(value) => {
                    self.stats.parsed += 1;
                    return Some(value);
                }
                Err(e) => {
                    self.stats.malformed += 1;
                    warn!(
                        line = %line.trim_end(),
                        error = %e,
                        "Unable to decode response line to json"
                    );
                }
            }
        }
    }
}

/// Decode a whole body into a vector.
pub fn decode_all<R: BufRead>(reader: R) -> Result<Vec<Value>, ApiError> {
    let mut decoder = StreamDecoder::from_reader(reader);
    let values: Vec<Value> = decoder.by_ref().collect();
    decoder.finish()?;
    Ok(values)
}
