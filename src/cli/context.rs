//! Wiring shared by every subcommand: config, stores and the HTTP client.

use std::error::Error;
use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::core::builtin_providers::{find_builtin_provider, ProviderProfile};
use crate::core::chat::ChatSession;
use crate::core::config::{path_display, Config, CredentialBackend};
use crate::core::conversation::ConversationStore;
use crate::core::credentials::CredentialStore;
use crate::core::dispatcher::ReplyDispatcher;
use crate::core::settings::{Settings, UnknownProviderError, Verbosity};
use crate::core::store::{FileStore, KeyValueStore, KeyringStore};
use crate::utils::logging::LoggingState;

/// Per-invocation overrides from global flags. None of them are persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub provider: Option<String>,
    pub detailed: bool,
    pub log_file: Option<String>,
}

pub struct AppContext {
    pub config: Config,
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
    client: Client,
}

impl AppContext {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::from_config(Config::load()?)
    }

    pub fn from_config(config: Config) -> Result<Self, Box<dyn Error>> {
        let store_path = config.store_path()?;
        debug!(path = %path_display(&store_path), "Opening store");
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(store_path));

        let credentials = match config.credential_backend() {
            CredentialBackend::File => CredentialStore::new(Arc::clone(&store)),
            CredentialBackend::Keyring => CredentialStore::with_secret_store(
                Arc::clone(&store),
                Arc::new(KeyringStore::default()),
            ),
        };

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            config,
            store,
            credentials,
            client,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn conversation(&self) -> ConversationStore {
        ConversationStore::open(Arc::clone(&self.store))
    }

    /// Persisted settings with the flag overrides applied on top.
    pub fn settings(&self, overrides: &SessionOverrides) -> Result<Settings, UnknownProviderError> {
        let mut settings = Settings::load(&self.credentials, &self.config);
        if let Some(requested) = overrides.provider.as_deref() {
            settings.selected_provider = lookup_provider(requested)?.id.clone();
        }
        if overrides.detailed {
            settings.verbosity = Verbosity::Detailed;
        }
        Ok(settings)
    }

    pub fn dispatcher(&self) -> ReplyDispatcher {
        ReplyDispatcher::new(self.client.clone(), self.credentials.clone())
            .with_endpoint_overrides(self.config.endpoint_overrides())
    }

    pub fn open_session(
        &self,
        overrides: &SessionOverrides,
    ) -> Result<ChatSession, Box<dyn Error>> {
        let settings = self.settings(overrides)?;
        let logging = LoggingState::new(overrides.log_file.clone())?;
        Ok(ChatSession::new(
            self.conversation(),
            settings,
            self.dispatcher(),
            logging,
        ))
    }
}

pub fn lookup_provider(id: &str) -> Result<&'static ProviderProfile, UnknownProviderError> {
    find_builtin_provider(id).ok_or_else(|| UnknownProviderError::new(id))
}
