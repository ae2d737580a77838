use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::parse::parse_response;
use super::prompts::claude_prompt;
use super::{AiProvider, ProviderError, ProviderInfo};
use crate::parser::types::TestCaseSpec;

pub const CLAUDE_MODEL: &str = "claude-3-sonnet-20240229";
pub const MAX_TOKENS: u32 = 4000;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const NAME: &str = "Claude";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API provider
pub struct ClaudeProvider {
    api_key: Option<String>,
    client: Client,
    api_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_api_url(api_key, ANTHROPIC_API_URL)
    }

    /// Provider talking to a different API host
    pub fn with_api_url(api_key: Option<String>, api_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    fn key(&self) -> &'static str {
        "claude"
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            key: self.key(),
            name: NAME,
            provider: "Anthropic",
            model: CLAUDE_MODEL,
            description: "Advanced reasoning and analysis capabilities",
            available: self.is_available(),
        }
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        context: &str,
        template: Option<&Value>,
    ) -> Result<Vec<TestCaseSpec>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(NAME))?;

        let body = json!({
            "model": CLAUDE_MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {"role": "user", "content": claude_prompt(context, template)}
            ],
        });

        let request_error = |source| ProviderError::Request {
            provider: NAME,
            source,
        };
        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: NAME,
                status: status.as_u16(),
                body,
            });
        }

        let message: MessagesResponse = response.json().await.map_err(request_error)?;
        let text = message
            .content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse(NAME))?;

        log::debug!("Claude returned {} characters", text.len());
        Ok(parse_response(&text))
    }
}
