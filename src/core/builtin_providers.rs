//! Built-in provider registry
//!
//! Provider profiles are compiled into the binary from
//! `builtin_providers.toml`. Lookups never fail: an unknown identifier
//! resolves to the [`DEFAULT_PROVIDER`] profile.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Identifier used whenever a requested provider is unknown.
pub const DEFAULT_PROVIDER: &str = "huggingface";

/// Request/response family a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiStyle {
    /// Single free-text prompt, reply in `[0].generated_text`.
    TextGeneration,
    /// Role/content message list, reply in `choices[0].message.content`.
    ChatCompletions,
    /// Nested contents/parts, reply in `candidates[0].content.parts[0].text`.
    GenerateContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub display_name: String,
    pub api_url: String,
    pub model: String,
    pub api_style: ApiStyle,
    pub requires_auth: bool,
    pub auth_header: String,
    #[serde(default)]
    pub auth_prefix: String,
    /// Where the user can create an API key for this provider
    pub key_url: Option<String>,
}

impl ProviderProfile {
    /// Value placed in [`Self::auth_header`] for the given secret.
    pub fn auth_value(&self, secret: &str) -> String {
        if self.auth_prefix.is_empty() {
            secret.to_string()
        } else {
            format!("{} {secret}", self.auth_prefix)
        }
    }
}

#[derive(Debug, Deserialize)]
struct BuiltinProvidersConfig {
    providers: Vec<ProviderProfile>,
}

static BUILTIN_PROVIDERS: LazyLock<Vec<ProviderProfile>> = LazyLock::new(|| {
    const CONFIG_CONTENT: &str = include_str!("../builtin_providers.toml");

    let config: BuiltinProvidersConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_providers.toml");

    config.providers
});

/// All built-in providers in declaration order
pub fn builtin_providers() -> &'static [ProviderProfile] {
    &BUILTIN_PROVIDERS
}

/// Find a built-in provider by ID (case-insensitive)
pub fn find_builtin_provider(id: &str) -> Option<&'static ProviderProfile> {
    builtin_providers()
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Resolve a provider profile, falling back to the default provider.
pub fn resolve_provider(id: &str) -> &'static ProviderProfile {
    find_builtin_provider(id).unwrap_or_else(default_provider)
}

pub fn default_provider() -> &'static ProviderProfile {
    find_builtin_provider(DEFAULT_PROVIDER).expect("default provider must be built in")
}

/// Provider identifiers in declaration order
pub fn list_provider_ids() -> Vec<&'static str> {
    builtin_providers().iter().map(|p| p.id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_builtin_providers() {
        let ids = list_provider_ids();
        assert_eq!(
            ids,
            vec!["huggingface", "groq", "together", "openrouter", "gemini"]
        );
        assert_eq!(ids, list_provider_ids());
    }

    #[test]
    fn test_find_builtin_provider() {
        let provider = find_builtin_provider("Groq").unwrap();
        assert_eq!(provider.id, "groq");
        assert_eq!(provider.display_name, "Groq");
        assert_eq!(provider.api_style, ApiStyle::ChatCompletions);

        assert!(find_builtin_provider("nonexistent").is_none());
    }

    #[test]
    fn unknown_provider_resolves_to_default() {
        let provider = resolve_provider("definitely-not-a-provider");
        assert_eq!(provider.id, DEFAULT_PROVIDER);
        assert_eq!(provider.display_name, "Hugging Face");

        assert_eq!(resolve_provider("").id, DEFAULT_PROVIDER);
        assert_eq!(resolve_provider("gemini").id, "gemini");
    }

    #[test]
    fn auth_value_respects_prefix() {
        let groq = resolve_provider("groq");
        assert_eq!(groq.auth_value("sk-1"), "Bearer sk-1");

        let gemini = resolve_provider("gemini");
        assert_eq!(gemini.auth_header, "x-goog-api-key");
        assert_eq!(gemini.auth_value("g-1"), "g-1");
    }

    #[test]
    fn test_provider_properties() {
        for provider in builtin_providers() {
            assert!(!provider.id.is_empty());
            assert!(!provider.display_name.is_empty());
            assert!(!provider.model.is_empty());
            assert!(provider.api_url.starts_with("https://"));
            assert!(provider.requires_auth);
        }
    }
}
