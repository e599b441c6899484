//! Loosely-typed log records
//!
//! Every recognized field is optional and tolerant: a value of the wrong JSON
//! type is read as absent instead of rejecting the whole line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One decoded JSON line from an agent log
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Record {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub(crate) kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) timestamp: Option<String>,
    #[serde(rename = "agentId", default, deserialize_with = "lenient")]
    pub(crate) agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) slug: Option<String>,
    #[serde(rename = "sessionId", default, deserialize_with = "lenient")]
    pub(crate) session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) cwd: Option<String>,
    #[serde(rename = "requestId", default, deserialize_with = "lenient")]
    pub(crate) request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Message {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) model: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) stop_reason: Option<String>,
    /// Kept raw: counters are read individually so one bad counter does not
    /// discard the others.
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) usage: Option<Map<String, Value>>,
}

/// Deserialize into `T`, falling back to `None` on a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Record {
    /// Decode one line. Returns `None` for invalid JSON or non-object values.
    pub(crate) fn from_line(line: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(line).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub(crate) fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    pub(crate) fn is_message(&self) -> bool {
        matches!(self.kind(), "user" | "assistant")
    }

    pub(crate) fn model(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.model.as_deref())
            .unwrap_or("")
    }

    pub(crate) fn stop_reason(&self) -> Option<&str> {
        self.message.as_ref()?.stop_reason.as_deref()
    }

    /// The usage block, if present and non-empty
    pub(crate) fn usage(&self) -> Option<&Map<String, Value>> {
        self.message
            .as_ref()?
            .usage
            .as_ref()
            .filter(|usage| !usage.is_empty())
    }
}
