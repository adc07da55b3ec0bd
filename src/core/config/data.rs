use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Where provider API keys are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Alongside history in the data directory store.
    #[default]
    File,
    /// In the platform keyring.
    Keyring,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Provider used when no selection has been persisted yet
    pub default_provider: Option<String>,
    /// Start sessions in detailed mode
    pub detailed: Option<bool>,
    /// HTTP timeout for provider calls, in seconds
    pub request_timeout_secs: Option<u64>,
    pub credential_backend: Option<CredentialBackend>,
    /// Directory holding the conversation/settings store
    pub data_dir: Option<PathBuf>,
    /// Per-provider endpoint overrides (provider id -> URL)
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn credential_backend(&self) -> CredentialBackend {
        self.credential_backend.unwrap_or_default()
    }

    pub fn detailed_by_default(&self) -> bool {
        self.detailed.unwrap_or(false)
    }

    pub fn set_endpoint_override(&mut self, provider: &str, url: String) {
        let normalized = provider.to_lowercase();
        if normalized != provider {
            self.endpoints.remove(provider);
        }
        self.endpoints.insert(normalized, url);
    }

    /// Returns whether an override was present.
    pub fn remove_endpoint_override(&mut self, provider: &str) -> bool {
        let normalized = provider.to_lowercase();
        let removed_exact = self.endpoints.remove(provider).is_some();
        self.endpoints.remove(&normalized).is_some() || removed_exact
    }

    /// Overrides keyed by lowercase provider id.
    pub fn endpoint_overrides(&self) -> HashMap<String, String> {
        self.endpoints
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(id, url)| (id.to_lowercase(), url.clone()))
            .collect()
    }
}
