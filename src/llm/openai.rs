use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::llm::ChatProvider;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// The OpenAI chat-completions backend.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

/// Maps an OpenAI error response onto the upstream taxonomy.
fn classify_error(status: StatusCode, body: &str) -> UpstreamError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            UpstreamError::Auth("Invalid OpenAI API key".to_string())
        }
        StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS => {
            UpstreamError::Quota("OpenAI API quota exceeded".to_string())
        }
        _ => UpstreamError::Provider(format!("OpenAI request failed ({}): {}", status, body)),
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::Auth("Invalid OpenAI API key".to_string()))?;

        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                Message { role: "system", content: system_prompt },
                Message { role: "user", content: user_prompt },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Provider(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Provider(format!("OpenAI response malformed: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| UpstreamError::Provider("OpenAI returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_classify_as_auth() {
        assert!(matches!(
            classify_error(StatusCode::UNAUTHORIZED, "invalid_api_key"),
            UpstreamError::Auth(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, ""),
            UpstreamError::Auth(_)
        ));
    }

    #[test]
    fn quota_failures_classify_as_quota() {
        assert!(matches!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, "insufficient_quota"),
            UpstreamError::Quota(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::PAYMENT_REQUIRED, ""),
            UpstreamError::Quota(_)
        ));
    }

    #[test]
    fn anything_else_is_a_provider_error() {
        assert!(matches!(
            classify_error(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            UpstreamError::Provider(_)
        ));
    }
}
