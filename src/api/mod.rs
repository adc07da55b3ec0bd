//! Wire formats of the supported provider APIs.
//!
//! Each [`ApiStyle`] has one [`ProviderApi`] implementation that knows how to
//! build the request body, attach the credential and pull the reply text out
//! of the response. Adding a provider that speaks an existing style only
//! needs a registry entry.

pub mod chat_completions;
pub mod generate_content;
pub mod text_generation;

use crate::core::builtin_providers::{ApiStyle, ProviderProfile};
use reqwest::{Client, RequestBuilder};
use std::error::Error as StdError;
use std::fmt;

pub use chat_completions::ChatCompletionsApi;
pub use generate_content::GenerateContentApi;
pub use text_generation::TextGenerationApi;

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationPreset {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Reply text could not be pulled out of a response body.
#[derive(Debug)]
pub enum ExtractError {
    /// The body is not JSON, or not JSON of the expected type.
    Decode(serde_json::Error),
    /// The body parsed but the reply path is absent.
    MissingField(&'static str),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Decode(err) => write!(f, "invalid response body: {err}"),
            ExtractError::MissingField(path) => write!(f, "response has no {path}"),
        }
    }
}

impl StdError for ExtractError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ExtractError::Decode(err) => Some(err),
            ExtractError::MissingField(_) => None,
        }
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Decode(err)
    }
}

pub trait ProviderApi: Send + Sync {
    /// POST request carrying the prompt, without credentials.
    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        profile: &ProviderProfile,
        prompt: &str,
        preset: GenerationPreset,
    ) -> RequestBuilder;

    /// Attach the credential. Defaults to the profile's header and prefix.
    fn apply_auth(
        &self,
        request: RequestBuilder,
        profile: &ProviderProfile,
        secret: &str,
    ) -> RequestBuilder {
        request.header(profile.auth_header.as_str(), profile.auth_value(secret))
    }

    fn extract_reply(&self, body: &[u8]) -> Result<String, ExtractError>;
}

/// Adapter for a provider's API style.
pub fn api_for(style: ApiStyle) -> &'static dyn ProviderApi {
    match style {
        ApiStyle::TextGeneration => &TextGenerationApi,
        ApiStyle::ChatCompletions => &ChatCompletionsApi,
        ApiStyle::GenerateContent => &GenerateContentApi,
    }
}
