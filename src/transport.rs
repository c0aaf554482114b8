//! Blocking HTTP transport for the server API.
//!
//! Requests run on a private current-thread tokio runtime. Response bodies are
//! exposed as a blocking reader that pulls one network chunk at a time, so the
//! stream decoder can stop early without the body being buffered.

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::response::{LossyLines, ResponseEnvelope, StreamDecoder};
use reqwest::header::{ACCEPT_ENCODING, CONTENT_TYPE};
use serde_json::Value;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// Header carrying the API access token.
pub const TOKEN_HEADER: &str = "X-NSG-Auth-API-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

/// A response as the decode layer sees it: status, content type, and a line-readable body.
pub struct RawResponse<R> {
    status: u16,
    content_type: Option<String>,
    body: R,
}

impl<R: BufRead> RawResponse<R> {
    pub fn new(status: u16, content_type: Option<String>, body: R) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Lazily decode an array-per-line body.
    pub fn decoder(self) -> StreamDecoder<LossyLines<R>> {
        StreamDecoder::from_reader(self.body)
    }

    pub fn into_body(self) -> R {
        self.body
    }

    /// Envelope for an array-per-line body.
    pub fn into_stream_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope::from_stream(self.status, self.body)
    }

    /// Envelope for a single-document JSON body.
    pub fn into_document_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope::from_document(self.status, self.body)
    }
}

/// Blocking reader over an async response, one chunk at a time.
pub struct ChunkReader {
    runtime: Arc<Runtime>,
    response: reqwest::Response,
    chunk: Vec<u8>,
    pos: usize,
    done: bool,
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.chunk.len() {
            if self.done {
                return Ok(0);
            }
            let response = &mut self.response;
            match self.runtime.block_on(async move { response.chunk().await }) {
                Ok(Some(bytes)) => {
                    self.chunk = bytes.to_vec();
                    self.pos = 0;
                }
                Ok(None) => self.done = true,
                Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e)),
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Join a base URL and an API path with exactly one slash.
pub fn concatenate_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Flatten a JSON object into string key/value pairs for query strings and forms.
pub fn query_pairs(data: &Value) -> Vec<(String, String)> {
    match data {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), v)
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Client for one server.
pub struct ApiClient {
    http: reqwest::Client,
    runtime: Arc<Runtime>,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(server: &ServerConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create runtime: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            http,
            runtime: Arc::new(runtime),
            base_url: server.base_url.clone(),
            token: server.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request and return the response with its body still unread.
    ///
    /// `data` goes to the query string for GET, the JSON body for POST, and a
    /// form body for PUT.
    pub fn call(
        &self,
        method: Method,
        path: &str,
        data: Option<&Value>,
    ) -> Result<RawResponse<BufReader<ChunkReader>>, ApiError> {
        let url = concatenate_url(&self.base_url, path);
        debug!(?method, url = %url, "calling api");

        let mut request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
        };
        if let Some(data) = data {
            request = match method {
                Method::Get => request.query(&query_pairs(data)),
                Method::Post => request.json(data),
                Method::Put => request.form(&query_pairs(data)),
            };
        }
        // An empty Accept-Encoding keeps the body uncompressed so it streams line by line.
        request = request.header(ACCEPT_ENCODING, "");
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        // reqwest arms its timeout when the request future is built, so build it inside the runtime.
        let response = self.runtime.block_on(async move { request.send().await })?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(status, content_type = ?content_type, "api responded");

        let reader = ChunkReader {
            runtime: Arc::clone(&self.runtime),
            response,
            chunk: Vec::new(),
            pos: 0,
            done: false,
        };
        Ok(RawResponse::new(status, content_type, BufReader::new(reader)))
    }
}
