//! Turn controller tying the conversation, settings and dispatcher together.
//!
//! At most one reply is outstanding at a time. [`ChatSession::submit`]
//! records the user message, marks the session busy and spawns the provider
//! call; the reply comes back as [`ChatEvent::Reply`] and is applied by
//! [`ChatSession::next_event`].

use crate::core::builtin_providers::ProviderProfile;
use crate::core::conversation::ConversationStore;
use crate::core::credentials::CredentialStore;
use crate::core::dispatcher::ReplyDispatcher;
use crate::core::events::ChatEvent;
use crate::core::message::{Message, Sender};
use crate::core::settings::{Settings, UnknownProviderError, Verbosity};
use crate::utils::logging::LoggingState;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Blank input; nothing was recorded.
    Empty,
    /// A reply is still outstanding.
    Busy,
    /// The turn ended without a reply being recorded.
    Disconnected,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Empty => write!(f, "Message is empty"),
            SubmitError::Busy => write!(f, "Still waiting for the previous reply"),
            SubmitError::Disconnected => write!(f, "No reply was received"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: Message,
    /// Signals raised while the reply was fetched (e.g. a missing key).
    pub notices: Vec<ChatEvent>,
}

pub struct ChatSession {
    conversation: ConversationStore,
    settings: Settings,
    dispatcher: ReplyDispatcher,
    logging: LoggingState,
    busy: bool,
    events_tx: mpsc::UnboundedSender<ChatEvent>,
    events_rx: mpsc::UnboundedReceiver<ChatEvent>,
}

impl ChatSession {
    pub fn new(
        conversation: ConversationStore,
        settings: Settings,
        dispatcher: ReplyDispatcher,
        logging: LoggingState,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            conversation,
            settings,
            dispatcher: dispatcher.with_events(events_tx.clone()),
            logging,
            busy: false,
            events_tx,
            events_rx,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn provider(&self) -> &'static ProviderProfile {
        self.settings.provider()
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.dispatcher.credentials()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn logging(&self) -> &LoggingState {
        &self.logging
    }

    pub fn logging_mut(&mut self) -> &mut LoggingState {
        &mut self.logging
    }

    pub fn select_provider(
        &mut self,
        provider_id: &str,
    ) -> Result<&'static ProviderProfile, UnknownProviderError> {
        let credentials = self.dispatcher.credentials().clone();
        self.settings.select_provider(provider_id, &credentials)
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.settings.set_verbosity(verbosity);
    }

    pub fn toggle_verbosity(&mut self) -> Verbosity {
        let next = self.settings.verbosity.toggled();
        self.settings.set_verbosity(next);
        next
    }

    /// Store an API key for the selected provider. Blank input is ignored.
    pub fn set_api_key(&self, secret: &str) -> bool {
        self.credentials()
            .set_credential(&self.settings.selected_provider, secret)
    }

    /// Erase the whole conversation. Callers confirm with the user first.
    /// Refused while a reply is outstanding.
    pub fn clear(&mut self) -> Result<(), SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        self.conversation.clear();
        Ok(())
    }

    /// Record `text` as a user message and start fetching the reply.
    pub fn submit(&mut self, text: &str) -> Result<Message, SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        let message = self
            .conversation
            .append(Sender::User, text)
            .ok_or(SubmitError::Empty)?;
        self.log(&message);

        self.set_busy(true);
        let dispatcher = self.dispatcher.clone();
        let events = self.events_tx.clone();
        let prompt = message.text.clone();
        let verbosity = self.settings.verbosity;
        let provider_id = self.settings.selected_provider.clone();
        debug!(provider = %provider_id, verbosity = verbosity.label(), "Dispatching turn");

        tokio::spawn(async move {
            let reply = dispatcher.fetch_reply(&prompt, verbosity, &provider_id).await;
            let _ = events.send(ChatEvent::Reply(reply));
        });

        Ok(message)
    }

    /// Wait for the next event. A [`ChatEvent::Reply`] is appended to the
    /// conversation before it is returned.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        let event = self.events_rx.recv().await?;
        if let ChatEvent::Reply(text) = &event {
            self.finish_turn(text);
        }
        Some(event)
    }

    /// Submit `text` and wait for its reply.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, SubmitError> {
        self.submit(text)?;

        let mut notices = Vec::new();
        let mut reply = None;
        while let Some(event) = self.events_rx.recv().await {
            match event {
                ChatEvent::Reply(text) => {
                    reply = self.finish_turn(&text);
                    break;
                }
                ChatEvent::BusyChanged(_) => {}
                other => notices.push(other),
            }
        }

        let reply = reply.ok_or(SubmitError::Disconnected)?;
        Ok(TurnOutcome { reply, notices })
    }

    /// Record the bot reply and release the busy flag. Blank replies are
    /// dropped.
    fn finish_turn(&mut self, text: &str) -> Option<Message> {
        let message = self.conversation.append(Sender::Bot, text);
        match &message {
            Some(message) => self.log(message),
            None => warn!("Dropped blank bot reply"),
        }
        self.set_busy(false);
        message
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        let _ = self.events_tx.send(ChatEvent::BusyChanged(busy));
    }

    fn log(&self, message: &Message) {
        if let Err(err) = self.logging.log_message(message) {
            warn!(error = %err, "Failed to write transcript");
        }
    }
}
