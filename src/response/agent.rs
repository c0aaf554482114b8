//! Replies from agents to exec and agent commands.

use super::errors::extract_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One agent's reply, as streamed by the exec endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    pub agent: String,
    #[serde(default)]
    pub agent_address: Option<String>,
    #[serde(default)]
    pub exit_status: Option<i64>,
    #[serde(default)]
    pub response: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// How exit codes are explained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMode {
    #[default]
    Generic,
    /// fping's documented exit codes.
    Fping,
}

impl AgentReply {
    /// Parse a decoded stream element. `None` when it is not an agent reply.
    pub fn from_value(value: &Value) -> Option<AgentReply> {
        AgentReply::deserialize(value).ok()
    }

    /// Human-readable status for the reply's exit code.
    pub fn status_text(&self, mode: StatusMode) -> String {
        let code = self.exit_status;
        if code == Some(0) {
            return "ok".to_string();
        }
        if mode == StatusMode::Fping {
            let known = match code {
                Some(1) => Some("some hosts were unreachable"),
                Some(2) => Some("any IP addresses were not found"),
                Some(3) => Some("invalid command line arguments"),
                Some(4) => Some("system call failure"),
                Some(-1) => Some("could not find and execute the command"),
                _ => None,
            };
            if let Some(text) = known {
                return text.to_string();
            }
        }
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return error.to_string();
        }
        match code {
            Some(-1) => "could not find and execute the command".to_string(),
            _ => "unknown error".to_string(),
        }
    }

    /// Output lines joined with newlines.
    pub fn output(&self) -> String {
        self.response
            .iter()
            .map(|line| match line {
                Value::String(s) => s.trim_end().to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self, mode: StatusMode) -> String {
        format!(
            "\nSource: {} ({})\nStatus: {}\nOutput: \n{}\n",
            self.agent,
            self.agent_address.as_deref().unwrap_or(""),
            self.status_text(mode),
            self.output()
        )
    }
}

/// Render a stream of decoded elements as agent reply blocks.
///
/// Elements that are not agent replies are shown as `ERROR:` lines with their
/// extracted error message.
pub fn render_replies<I>(values: I, mode: StatusMode) -> String
where
    I: IntoIterator<Item = Value>,
{
    let mut out = String::new();
    for value in values {
        match AgentReply::from_value(&value) {
            Some(reply) => out.push_str(&reply.render(mode)),
            None => out.push_str(&format!("ERROR: {}\n", extract_error(&value))),
        }
    }
    out
}
