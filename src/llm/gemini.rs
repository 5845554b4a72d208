use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::llm::ChatProvider;

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent";

/// The Google Gemini backend.
///
/// Gemini takes no separate system role here; the system prompt and the
/// question are concatenated into a single text part.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

/// Maps a Gemini error response onto the upstream taxonomy.
///
/// Gemini reports a bad key as 400 with an "API key not valid" message, not
/// as 401, so the body participates in classification.
fn classify_error(status: StatusCode, body: &str) -> UpstreamError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            UpstreamError::Auth("Invalid Gemini API key".to_string())
        }
        StatusCode::BAD_REQUEST if body.contains("API key") => {
            UpstreamError::Auth("Invalid Gemini API key".to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => {
            UpstreamError::Quota("Gemini API quota exceeded".to_string())
        }
        _ => UpstreamError::Provider(format!("Gemini request failed ({}): {}", status, body)),
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::Auth("Invalid Gemini API key".to_string()))?;

        let full_prompt = format!("{}\n\nStudent Question: {}", system_prompt, user_prompt);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &full_prompt }],
            }],
        };

        // The key travels in a header so it never appears in logged URLs.
        let response = self
            .client
            .post(GENERATE_URL)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Provider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Provider(format!("Gemini response malformed: {}", e)))?;

        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| UpstreamError::Provider("Gemini returned no candidates".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_key_classifies_as_auth_even_on_400() {
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key."),
            UpstreamError::Auth(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, ""),
            UpstreamError::Auth(_)
        ));
    }

    #[test]
    fn plain_bad_request_stays_a_provider_error() {
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, "unknown field"),
            UpstreamError::Provider(_)
        ));
    }

    #[test]
    fn rate_limit_classifies_as_quota() {
        assert!(matches!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, ""),
            UpstreamError::Quota(_)
        ));
    }
}
