//! Persisted conversation log.
//!
//! The whole sequence is written as one JSON array under
//! [`CHAT_HISTORY_KEY`] after every mutation. Loading is forgiving: bad
//! timestamps are replaced, unreadable entries are dropped, and a blob that
//! is not an array at all is erased.

use crate::core::message::{next_message_id, Message, Sender};
use crate::core::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CHAT_HISTORY_KEY: &str = "chatHistory";

pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    messages: Vec<Message>,
}

impl ConversationStore {
    /// An empty conversation backed by `store`. Call [`Self::load`] to
    /// rehydrate persisted history.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            messages: Vec::new(),
        }
    }

    /// Create a store and immediately load persisted history.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let mut conversation = Self::new(store);
        conversation.load();
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message and persist the conversation. Blank text is
    /// rejected without creating an entry.
    pub fn append(&mut self, sender: Sender, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            return None;
        }

        let now = Utc::now();
        let id = next_message_id(self.messages.last().map(|m| m.id.as_str()), now);
        let message = Message {
            id,
            text: text.to_string(),
            sender,
            timestamp: now,
        };
        self.messages.push(message.clone());
        self.persist();
        Some(message)
    }

    /// Replace the in-memory sequence with the persisted one.
    pub fn load(&mut self) -> &[Message] {
        self.messages = match self.store.get(CHAT_HISTORY_KEY) {
            Ok(Some(blob)) => match parse_history(&blob) {
                Some(messages) => messages,
                None => {
                    warn!("Discarding corrupted chat history");
                    if let Err(err) = self.store.remove(CHAT_HISTORY_KEY) {
                        warn!(error = %err, "Failed to remove corrupted chat history");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read chat history");
                Vec::new()
            }
        };
        debug!(count = self.messages.len(), "Loaded chat history");
        &self.messages
    }

    /// Drop every message, in memory and on disk.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Err(err) = self.store.remove(CHAT_HISTORY_KEY) {
            warn!(error = %err, "Failed to erase chat history");
        }
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.messages) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "Failed to encode chat history");
                return;
            }
        };
        if let Err(err) = self.store.set(CHAT_HISTORY_KEY, &blob) {
            warn!(error = %err, "Failed to save chat history");
        }
    }
}

/// Parse a persisted history blob. `None` means the blob is unusable as a
/// whole; individual bad entries are repaired or skipped.
fn parse_history(blob: &str) -> Option<Vec<Message>> {
    let entries = match serde_json::from_str::<Value>(blob).ok()? {
        Value::Array(entries) => entries,
        _ => return None,
    };

    let mut messages: Vec<Message> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match repair_entry(entry, messages.last()) {
            Some(message) => messages.push(message),
            None => warn!(index, "Skipping unreadable chat history entry"),
        }
    }
    Some(messages)
}

fn repair_entry(entry: &Value, previous: Option<&Message>) -> Option<Message> {
    let object = entry.as_object()?;
    let text = object.get("text")?.as_str()?.to_string();
    let sender = Sender::try_from(object.get("sender")?.as_str()?).ok()?;

    let now = Utc::now();
    let timestamp = object
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or(now);

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => next_message_id(previous.map(|m| m.id.as_str()), now),
    };

    Some(Message {
        id,
        text,
        sender,
        timestamp,
    })
}
