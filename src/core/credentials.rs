//! Per-provider API keys and the persisted provider selection.
//!
//! Store failures never reach the caller: they are logged and treated as
//! "nothing stored" (reads) or "not persisted" (writes).

use crate::core::store::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

pub const SELECTED_PROVIDER_KEY: &str = "selectedProvider";
const API_KEY_PREFIX: &str = "apiKey_";

pub fn api_key_key(provider_id: &str) -> String {
    format!("{API_KEY_PREFIX}{}", provider_id.to_ascii_lowercase())
}

#[derive(Clone)]
pub struct CredentialStore {
    settings: Arc<dyn KeyValueStore>,
    secrets: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Keep settings and secrets in the same store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            settings: Arc::clone(&store),
            secrets: store,
        }
    }

    /// Keep secrets in a separate store (e.g. the system keyring).
    pub fn with_secret_store(
        settings: Arc<dyn KeyValueStore>,
        secrets: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { settings, secrets }
    }

    pub fn get_credential(&self, provider_id: &str) -> Option<String> {
        match self.secrets.get(&api_key_key(provider_id)) {
            Ok(value) => value.filter(|secret| !secret.trim().is_empty()),
            Err(err) => {
                warn!(provider = provider_id, error = %err, "Failed to read API key");
                None
            }
        }
    }

    pub fn has_credential(&self, provider_id: &str) -> bool {
        self.get_credential(provider_id).is_some()
    }

    /// Store a key for `provider_id`. Blank input leaves any existing key
    /// untouched. Returns whether the key was written.
    pub fn set_credential(&self, provider_id: &str, secret: &str) -> bool {
        let secret = secret.trim();
        if secret.is_empty() {
            return false;
        }
        match self.secrets.set(&api_key_key(provider_id), secret) {
            Ok(()) => true,
            Err(err) => {
                warn!(provider = provider_id, error = %err, "Failed to store API key");
                false
            }
        }
    }

    pub fn remove_credential(&self, provider_id: &str) -> bool {
        match self.secrets.remove(&api_key_key(provider_id)) {
            Ok(()) => true,
            Err(err) => {
                warn!(provider = provider_id, error = %err, "Failed to remove API key");
                false
            }
        }
    }

    pub fn get_selected_provider(&self) -> Option<String> {
        match self.settings.get(SELECTED_PROVIDER_KEY) {
            Ok(value) => value
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            Err(err) => {
                warn!(error = %err, "Failed to read selected provider");
                None
            }
        }
    }

    pub fn set_selected_provider(&self, provider_id: &str) -> bool {
        match self.settings.set(SELECTED_PROVIDER_KEY, provider_id) {
            Ok(()) => true,
            Err(err) => {
                warn!(provider = provider_id, error = %err, "Failed to store selected provider");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{MemoryStore, StoreError};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Encode(
                serde_json::from_str::<u8>("x").unwrap_err(),
            ))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Encode(
                serde_json::from_str::<u8>("x").unwrap_err(),
            ))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn credentials_are_namespaced_per_provider() {
        let store = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(store.clone());

        credentials.set_selected_provider("groq");
        assert!(credentials.set_credential("groq", "gsk-groq"));
        credentials.set_selected_provider("gemini");
        assert!(credentials.set_credential("gemini", "g-gemini"));
        credentials.set_selected_provider("groq");

        assert_eq!(credentials.get_selected_provider().as_deref(), Some("groq"));
        assert_eq!(credentials.get_credential("groq").as_deref(), Some("gsk-groq"));
        assert_eq!(
            credentials.get_credential("gemini").as_deref(),
            Some("g-gemini")
        );
        assert_eq!(store.get("apiKey_groq").unwrap().as_deref(), Some("gsk-groq"));
    }

    #[test]
    fn blank_secret_does_not_overwrite() {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        credentials.set_credential("together", "tk-1");

        assert!(!credentials.set_credential("together", "   "));
        assert_eq!(credentials.get_credential("together").as_deref(), Some("tk-1"));
    }

    #[test]
    fn missing_credential_is_none() {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(credentials.get_credential("openrouter"), None);
        assert!(!credentials.has_credential("openrouter"));
        assert_eq!(credentials.get_selected_provider(), None);
    }

    #[test]
    fn remove_credential_clears_only_that_provider() {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        credentials.set_credential("groq", "a");
        credentials.set_credential("together", "b");

        assert!(credentials.remove_credential("groq"));
        assert_eq!(credentials.get_credential("groq"), None);
        assert_eq!(credentials.get_credential("together").as_deref(), Some("b"));
    }

    #[test]
    fn store_failures_are_swallowed() {
        let credentials = CredentialStore::new(Arc::new(BrokenStore));
        assert_eq!(credentials.get_credential("groq"), None);
        assert!(!credentials.set_credential("groq", "key"));
        assert!(!credentials.set_selected_provider("groq"));
        assert_eq!(credentials.get_selected_provider(), None);
    }

    #[test]
    fn secrets_can_live_in_a_separate_store() {
        let settings = Arc::new(MemoryStore::new());
        let secrets = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::with_secret_store(settings.clone(), secrets.clone());

        credentials.set_selected_provider("gemini");
        credentials.set_credential("gemini", "g-1");

        assert_eq!(settings.get("apiKey_gemini").unwrap(), None);
        assert_eq!(secrets.get("apiKey_gemini").unwrap().as_deref(), Some("g-1"));
        assert_eq!(
            settings.get(SELECTED_PROVIDER_KEY).unwrap().as_deref(),
            Some("gemini")
        );
    }
}
