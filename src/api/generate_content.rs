//! Gemini `generateContent`. The key travels as the `key` query parameter.

use super::{ExtractError, GenerationPreset, ProviderApi};
use crate::core::builtin_providers::ProviderProfile;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GenerateContentApi;

impl ProviderApi for GenerateContentApi {
    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        _profile: &ProviderProfile,
        prompt: &str,
        preset: GenerationPreset,
    ) -> RequestBuilder {
        client.post(endpoint).json(&GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: preset.max_tokens,
                temperature: preset.temperature,
            },
        })
    }

    fn apply_auth(
        &self,
        request: RequestBuilder,
        _profile: &ProviderProfile,
        secret: &str,
    ) -> RequestBuilder {
        request.query(&[("key", secret)])
    }

    fn extract_reply(&self, body: &[u8]) -> Result<String, ExtractError> {
        let response: GenerateContentResponse = serde_json::from_slice(body)?;
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(ExtractError::MissingField(
                "candidates[0].content.parts[0].text",
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, build};
    use crate::core::builtin_providers::resolve_provider;
    use serde_json::json;

    #[test]
    fn gemini_fixture_extracts_first_part() {
        let body = br#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello from Gemini."},{"text":"ignored"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(
            GenerateContentApi.extract_reply(body).unwrap(),
            "Hello from Gemini."
        );
    }

    #[test]
    fn key_travels_as_query_parameter() {
        let profile = resolve_provider("gemini");
        let request = build(&GenerateContentApi, profile, "weather today", Some("g-key"));

        assert_eq!(request.url().query(), Some("key=g-key"));
        assert!(request.headers().get("authorization").is_none());
        assert!(request.headers().get("x-goog-api-key").is_none());
        assert_eq!(
            body_json(&request),
            json!({
                "contents": [{"parts": [{"text": "weather today"}]}],
                "generationConfig": {"maxOutputTokens": 100, "temperature": 0.9}
            })
        );
    }

    #[test]
    fn unexpected_shapes_are_errors() {
        assert!(matches!(
            GenerateContentApi.extract_reply(br#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(ExtractError::MissingField(_))
        ));
        assert!(matches!(
            GenerateContentApi.extract_reply(br#"{"candidates":[{"content":{"parts":[]}}]}"#),
            Err(ExtractError::MissingField(_))
        ));
        assert!(matches!(
            GenerateContentApi.extract_reply(b""),
            Err(ExtractError::Decode(_))
        ));
    }
}
