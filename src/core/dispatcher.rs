//! Provider dispatch: one prompt in, one displayable reply out.
//!
//! [`ReplyDispatcher::fetch_reply`] never fails. Every failure path is a
//! [`FetchError`] that is collapsed in one place into the canned
//! [`fallback_reply`] for the active verbosity.

use crate::api::{api_for, ExtractError};
use crate::core::builtin_providers::{resolve_provider, ProviderProfile};
use crate::core::credentials::CredentialStore;
use crate::core::events::ChatEvent;
use crate::core::settings::Verbosity;
use reqwest::Client;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Canned reply used whenever a provider cannot produce one.
pub fn fallback_reply(text: &str, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Quick => {
            format!("Thanks for your message about \"{text}\"! Here's a quick response.")
        }
        Verbosity::Detailed => format!(
            "I understand you're asking about \"{text}\". This is a detailed response explaining the topic in depth with comprehensive information and examples."
        ),
    }
}

#[derive(Debug)]
pub enum FetchError {
    /// The provider requires an API key and none is stored.
    MissingCredential { provider_display_name: String },
    /// Connecting, sending, or reading the body failed.
    Request(reqwest::Error),
    /// The provider answered with a non-success status.
    Status { status: u16, body: String },
    /// The body did not contain a reply where the provider puts it.
    Extract(ExtractError),
    /// The provider returned an empty reply.
    EmptyReply,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::MissingCredential {
                provider_display_name,
            } => write!(f, "API key required for {provider_display_name}"),
            FetchError::Request(err) => write!(f, "HTTP request failed: {err}"),
            FetchError::Status { status, body } => {
                write!(f, "API error (status {status}): {body}")
            }
            FetchError::Extract(err) => write!(f, "Unexpected response: {err}"),
            FetchError::EmptyReply => write!(f, "Provider returned an empty reply"),
        }
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FetchError::Request(err) => Some(err),
            FetchError::Extract(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err)
    }
}

impl From<ExtractError> for FetchError {
    fn from(err: ExtractError) -> Self {
        FetchError::Extract(err)
    }
}

#[derive(Clone)]
pub struct ReplyDispatcher {
    client: Client,
    credentials: CredentialStore,
    endpoints: HashMap<String, String>,
    events: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ReplyDispatcher {
    pub fn new(client: Client, credentials: CredentialStore) -> Self {
        Self {
            client,
            credentials,
            endpoints: HashMap::new(),
            events: None,
        }
    }

    /// Send requests for the given providers (lowercase id -> URL) to a
    /// different endpoint than the built-in one.
    pub fn with_endpoint_overrides(mut self, endpoints: HashMap<String, String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Deliver [`ChatEvent::CredentialMissing`] signals to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ChatEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Ask `provider_id` for a reply to `text`. Always returns displayable
    /// text; failures yield the fallback reply.
    pub async fn fetch_reply(&self, text: &str, verbosity: Verbosity, provider_id: &str) -> String {
        let profile = resolve_provider(provider_id);

        match self.try_fetch(profile, text, verbosity).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(provider = %profile.id, error = %err, "Falling back to canned reply");
                if matches!(err, FetchError::MissingCredential { .. }) {
                    self.emit(ChatEvent::CredentialMissing {
                        provider_id: profile.id.clone(),
                        provider_display_name: profile.display_name.clone(),
                    });
                }
                fallback_reply(text, verbosity)
            }
        }
    }

    async fn try_fetch(
        &self,
        profile: &ProviderProfile,
        text: &str,
        verbosity: Verbosity,
    ) -> Result<String, FetchError> {
        let secret = self.credentials.get_credential(&profile.id);
        if profile.requires_auth && secret.is_none() {
            return Err(FetchError::MissingCredential {
                provider_display_name: profile.display_name.clone(),
            });
        }

        let api = api_for(profile.api_style);
        let endpoint = self.endpoint_for(profile);
        let mut request =
            api.build_request(&self.client, endpoint, profile, text, verbosity.preset());
        if let Some(secret) = secret.as_deref() {
            request = api.apply_auth(request, profile, secret);
        }

        debug!(
            provider = %profile.id,
            endpoint,
            verbosity = verbosity.label(),
            "Sending provider request"
        );
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect(),
            });
        }

        let reply = api.extract_reply(&body)?;
        if reply.trim().is_empty() {
            return Err(FetchError::EmptyReply);
        }
        debug!(provider = %profile.id, chars = reply.len(), "Received provider reply");
        Ok(reply)
    }

    fn endpoint_for<'a>(&'a self, profile: &'a ProviderProfile) -> &'a str {
        self.endpoints
            .get(&profile.id)
            .map(String::as_str)
            .unwrap_or(&profile.api_url)
    }

    fn emit(&self, event: ChatEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builtin_providers::list_provider_ids;
    use crate::core::store::MemoryStore;
    use crate::utils::test_utils::{closed_port_url, spawn_responder};
    use serde_json::json;
    use std::sync::Arc;

    fn dispatcher_with(
        credentials: CredentialStore,
        endpoints: &[(&str, String)],
    ) -> (ReplyDispatcher, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let overrides = endpoints
            .iter()
            .map(|(id, url)| (id.to_string(), url.clone()))
            .collect();
        let dispatcher = ReplyDispatcher::new(Client::new(), credentials)
            .with_endpoint_overrides(overrides)
            .with_events(tx);
        (dispatcher, rx)
    }

    fn credentials_for_all() -> CredentialStore {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        for id in list_provider_ids() {
            credentials.set_credential(id, &format!("key-{id}"));
        }
        credentials
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn fallback_templates_interpolate_text() {
        assert_eq!(
            fallback_reply("weather today", Verbosity::Quick),
            "Thanks for your message about \"weather today\"! Here's a quick response."
        );
        assert_eq!(
            fallback_reply("explain gravity", Verbosity::Detailed),
            "I understand you're asking about \"explain gravity\". This is a detailed response explaining the topic in depth with comprehensive information and examples."
        );
    }

    #[tokio::test]
    async fn unreachable_provider_yields_quick_fallback() {
        let (dispatcher, mut rx) =
            dispatcher_with(credentials_for_all(), &[("huggingface", closed_port_url())]);

        let reply = dispatcher
            .fetch_reply("weather today", Verbosity::Quick, "huggingface")
            .await;

        assert_eq!(
            reply,
            "Thanks for your message about \"weather today\"! Here's a quick response."
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn every_provider_falls_back_when_unreachable() {
        let endpoints: Vec<(&str, String)> = list_provider_ids()
            .into_iter()
            .map(|id| (id, closed_port_url()))
            .collect();
        let (dispatcher, _rx) = dispatcher_with(credentials_for_all(), &endpoints);

        for id in list_provider_ids() {
            for verbosity in [Verbosity::Quick, Verbosity::Detailed] {
                let reply = dispatcher.fetch_reply("ping", verbosity, id).await;
                assert_eq!(reply, fallback_reply("ping", verbosity), "provider {id}");
            }
        }
    }

    #[tokio::test]
    async fn missing_credential_signals_once_and_falls_back() {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let (dispatcher, mut rx) = dispatcher_with(credentials, &[("groq", closed_port_url())]);

        let reply = dispatcher
            .fetch_reply("explain gravity", Verbosity::Detailed, "groq")
            .await;

        assert_eq!(reply, fallback_reply("explain gravity", Verbosity::Detailed));
        assert_eq!(
            drain(&mut rx),
            vec![ChatEvent::CredentialMissing {
                provider_id: "groq".to_string(),
                provider_display_name: "Groq".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_provider_uses_default_profile() {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let (dispatcher, mut rx) = dispatcher_with(credentials, &[]);

        let reply = dispatcher
            .fetch_reply("hello", Verbosity::Quick, "no-such-provider")
            .await;

        assert_eq!(reply, fallback_reply("hello", Verbosity::Quick));
        assert_eq!(
            drain(&mut rx),
            vec![ChatEvent::CredentialMissing {
                provider_id: "huggingface".to_string(),
                provider_display_name: "Hugging Face".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn provider_fixtures_reduce_to_reply_text() {
        let fixtures = [
            (
                "huggingface",
                r#"[{"generated_text":"HF reply"}]"#,
                "HF reply",
            ),
            (
                "groq",
                r#"{"choices":[{"message":{"role":"assistant","content":"Groq reply"}}]}"#,
                "Groq reply",
            ),
            (
                "together",
                r#"{"choices":[{"message":{"role":"assistant","content":"Together reply"}}]}"#,
                "Together reply",
            ),
            (
                "openrouter",
                r#"{"choices":[{"message":{"role":"assistant","content":"OpenRouter reply"}}]}"#,
                "OpenRouter reply",
            ),
            (
                "gemini",
                r#"{"candidates":[{"content":{"parts":[{"text":"Gemini reply"}]}}]}"#,
                "Gemini reply",
            ),
        ];

        for (id, body, expected) in fixtures {
            let (url, server) = spawn_responder(200, body).await;
            let (dispatcher, mut rx) = dispatcher_with(credentials_for_all(), &[(id, url)]);

            let reply = dispatcher.fetch_reply("hi", Verbosity::Detailed, id).await;
            assert_eq!(reply, expected, "provider {id}");
            assert!(drain(&mut rx).is_empty());

            let captured = server.await.unwrap().unwrap();
            assert!(captured.request_line.starts_with("POST "));
            if id == "gemini" {
                assert!(captured.request_line.contains("?key=key-gemini"));
                assert_eq!(captured.header("authorization"), None);
            } else {
                let expected_auth = format!("Bearer key-{id}");
                assert_eq!(captured.header("authorization"), Some(expected_auth.as_str()));
            }
        }
    }

    #[tokio::test]
    async fn detailed_mode_sends_detailed_preset() {
        let (url, server) = spawn_responder(
            200,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        )
        .await;
        let (dispatcher, _rx) = dispatcher_with(credentials_for_all(), &[("together", url)]);

        dispatcher
            .fetch_reply("explain gravity", Verbosity::Detailed, "together")
            .await;

        let captured = server.await.unwrap().unwrap();
        assert_eq!(
            captured.body_json(),
            json!({
                "model": "togethercomputer/llama-2-70b-chat",
                "messages": [{"role": "user", "content": "explain gravity"}],
                "max_tokens": 200,
                "temperature": 0.7
            })
        );
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let (url, server) =
            spawn_responder(401, r#"{"error":{"message":"invalid api key"}}"#).await;
        let (dispatcher, mut rx) = dispatcher_with(credentials_for_all(), &[("openrouter", url)]);

        let reply = dispatcher
            .fetch_reply("hello", Verbosity::Quick, "openrouter")
            .await;

        assert_eq!(reply, fallback_reply("hello", Verbosity::Quick));
        assert!(drain(&mut rx).is_empty());
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let (url, server) = spawn_responder(200, "<html>oops</html>").await;
        let (dispatcher, _rx) = dispatcher_with(credentials_for_all(), &[("gemini", url)]);

        let reply = dispatcher
            .fetch_reply("hello", Verbosity::Detailed, "gemini")
            .await;

        assert_eq!(reply, fallback_reply("hello", Verbosity::Detailed));
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn empty_reply_falls_back() {
        let (url, server) = spawn_responder(200, r#"[{"generated_text":"   "}]"#).await;
        let (dispatcher, _rx) = dispatcher_with(credentials_for_all(), &[("huggingface", url)]);

        let reply = dispatcher
            .fetch_reply("hello", Verbosity::Quick, "huggingface")
            .await;

        assert_eq!(reply, fallback_reply("hello", Verbosity::Quick));
        server.await.unwrap().unwrap();
    }
}
