//! Per-session settings: the selected provider and the verbosity mode.

use crate::api::GenerationPreset;
use crate::core::builtin_providers::{
    find_builtin_provider, resolve_provider, ProviderProfile, DEFAULT_PROVIDER,
};
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quick,
    Detailed,
}

impl Verbosity {
    pub fn from_detailed(detailed: bool) -> Self {
        if detailed {
            Verbosity::Detailed
        } else {
            Verbosity::Quick
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Verbosity::Quick => Verbosity::Detailed,
            Verbosity::Detailed => Verbosity::Quick,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verbosity::Quick => "quick",
            Verbosity::Detailed => "detailed",
        }
    }

    /// Quick replies are short and livelier; detailed ones longer and steadier.
    pub fn preset(self) -> GenerationPreset {
        match self {
            Verbosity::Quick => GenerationPreset {
                max_tokens: 100,
                temperature: 0.9,
            },
            Verbosity::Detailed => GenerationPreset {
                max_tokens: 200,
                temperature: 0.7,
            },
        }
    }
}

#[derive(Debug)]
pub struct UnknownProviderError {
    requested: String,
}

impl UnknownProviderError {
    pub fn new(requested: &str) -> Self {
        Self {
            requested: requested.to_string(),
        }
    }
}

impl fmt::Display for UnknownProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown provider '{}'", self.requested)
    }
}

impl Error for UnknownProviderError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub selected_provider: String,
    pub verbosity: Verbosity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_provider: DEFAULT_PROVIDER.to_string(),
            verbosity: Verbosity::Quick,
        }
    }
}

impl Settings {
    /// Persisted selection first, then the configured default provider.
    pub fn load(credentials: &CredentialStore, config: &Config) -> Self {
        let requested = credentials
            .get_selected_provider()
            .or_else(|| config.default_provider.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        Self {
            selected_provider: resolve_provider(&requested).id.clone(),
            verbosity: Verbosity::from_detailed(config.detailed_by_default()),
        }
    }

    pub fn provider(&self) -> &'static ProviderProfile {
        resolve_provider(&self.selected_provider)
    }

    /// Switch providers and persist the choice. Unknown ids are rejected
    /// and leave the selection unchanged.
    pub fn select_provider(
        &mut self,
        provider_id: &str,
        credentials: &CredentialStore,
    ) -> Result<&'static ProviderProfile, UnknownProviderError> {
        let profile = find_builtin_provider(provider_id)
            .ok_or_else(|| UnknownProviderError::new(provider_id))?;
        self.selected_provider = profile.id.clone();
        credentials.set_selected_provider(&profile.id);
        Ok(profile)
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }
}
