//! Single-prompt text generation (Hugging Face inference style).

use super::{ExtractError, GenerationPreset, ProviderApi};
use crate::core::builtin_providers::ProviderProfile;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: TextGenerationParameters,
}

#[derive(Serialize)]
struct TextGenerationParameters {
    max_length: u32,
    temperature: f32,
    do_sample: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: Option<String>,
}

pub struct TextGenerationApi;

impl ProviderApi for TextGenerationApi {
    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        _profile: &ProviderProfile,
        prompt: &str,
        preset: GenerationPreset,
    ) -> RequestBuilder {
        client.post(endpoint).json(&TextGenerationRequest {
            inputs: prompt,
            parameters: TextGenerationParameters {
                max_length: preset.max_tokens,
                temperature: preset.temperature,
                do_sample: true,
            },
        })
    }

    fn extract_reply(&self, body: &[u8]) -> Result<String, ExtractError> {
        let generations: Vec<GeneratedText> = serde_json::from_slice(body)?;
        generations
            .into_iter()
            .next()
            .and_then(|first| first.generated_text)
            .ok_or(ExtractError::MissingField("[0].generated_text"))
    }
}
