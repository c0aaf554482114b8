//! Response handling: the array-per-line stream decoder, error extraction, and
//! the result envelope handed to command handlers.

pub mod agent;
pub mod decoder;
pub mod envelope;
pub mod errors;

pub use agent::{render_replies, AgentReply, StatusMode};
pub use decoder::{decode_all, DecodeStats, LossyLines, StreamDecoder};
pub use envelope::{ResponseEnvelope, STATUS_OK};
pub use errors::{extract_error, extract_error_bytes, find_error, first_error_line};
