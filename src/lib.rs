//! nsgcli: NetSpyGlass command-line client
//!
//! Decodes the server's streamed JSON responses, extracts error messages from
//! whatever shape the server sends, and renders query results as text tables.

pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod response;
pub mod tooling;
pub mod transport;

pub use error::ApiError;
pub use format::{FormatterConfig, TableFormatter, TimeFormat};
pub use response::{ResponseEnvelope, StreamDecoder};
