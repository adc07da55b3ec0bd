use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Speaker name shown in transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            _ => Err(format!("invalid sender: {value}")),
        }
    }
}

/// One exchanged utterance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: impl Into<String>, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Millisecond-based message ids that never go backwards within a
/// conversation, even when two messages share a clock tick.
///
/// A previous id that cannot be advanced (`i64::MAX`) is ignored and the
/// clock value is used.
pub fn next_message_id(previous: Option<&str>, now: DateTime<Utc>) -> String {
    let now_ms = now.timestamp_millis();
    let after_previous = match previous.and_then(|id| id.parse::<i64>().ok()) {
        Some(last) => last.checked_add(1).unwrap_or_else(|| {
            warn!(previous = last, "Previous message id cannot be advanced");
            i64::MIN
        }),
        None => i64::MIN,
    };
    now_ms.max(after_previous).to_string()
}
