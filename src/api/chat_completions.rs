//! OpenAI-compatible chat completions (Groq, Together.ai, OpenRouter).

use super::{ExtractError, GenerationPreset, ProviderApi};
use crate::core::builtin_providers::ProviderProfile;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsApi;

impl ProviderApi for ChatCompletionsApi {
    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        profile: &ProviderProfile,
        prompt: &str,
        preset: GenerationPreset,
    ) -> RequestBuilder {
        client.post(endpoint).json(&ChatRequest {
            model: &profile.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: preset.max_tokens,
            temperature: preset.temperature,
        })
    }

    fn extract_reply(&self, body: &[u8]) -> Result<String, ExtractError> {
        let response: ChatResponse = serde_json::from_slice(body)?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(ExtractError::MissingField("choices[0].message.content"))
    }
}
