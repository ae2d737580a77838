use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::parse::parse_response;
use super::prompts::gemini_prompt;
use super::{AiProvider, ProviderError, ProviderInfo};
use crate::parser::types::TestCaseSpec;

pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const NAME: &str = "Gemini";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Google Generative Language API provider
pub struct GeminiProvider {
    api_key: Option<String>,
    client: Client,
    api_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_api_url(api_key, GEMINI_API_URL)
    }

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
impl AiProvider for GeminiProvider {
    fn key(&self) -> &'static str {
        "gemini"
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            key: self.key(),
            name: NAME,
            provider: "Google",
            model: GEMINI_MODEL,
            description: "Fast and efficient AI model with strong reasoning",
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
            "contents": [
                {"parts": [{"text": gemini_prompt(context, template)}]}
            ],
        });

        let request_error = |source| ProviderError::Request {
            provider: NAME,
            source,
        };
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.api_url, GEMINI_MODEL
            ))
            .query(&[("key", api_key)])
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

        let reply: GenerateResponse = response.json().await.map_err(request_error)?;
        let text: String = reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(NAME));
        }

        log::debug!("Gemini returned {} characters", text.len());
        Ok(parse_response(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::post, Json, Router};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_joins_parts_and_parses() {
        let app = Router::new().route(
            "/v1beta/models/gemini-1.5-flash:generateContent",
            post(
                |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                    assert_eq!(query["key"], "g-key");
                    assert!(body["contents"][0]["parts"][0]["text"]
                        .as_str()
                        .unwrap()
                        .contains("QA expert"));
                    Json(json!({
                        "candidates": [{
                            "content": {"parts": [
                                {"text": "```json\n[{\"name\": \"Mobile layout\", "},
                                {"text": "\"category\": \"UI\"}]\n```"}
                            ]}
                        }]
                    }))
                },
            ),
        );
        let provider = GeminiProvider::with_api_url(Some("g-key".into()), &serve(app).await);

        let cases = provider.generate("ctx", None).await.unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].display_name(), "Mobile layout");
        assert_eq!(cases[0].category_label(), "UI");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let app = Router::new().route(
            "/v1beta/models/gemini-1.5-flash:generateContent",
            post(|| async { Json(json!({"candidates": []})) }),
        );
        let provider = GeminiProvider::with_api_url(Some("g-key".into()), &serve(app).await);
        assert!(matches!(
            provider.generate("ctx", None).await,
            Err(ProviderError::EmptyResponse("Gemini"))
        ));
    }
}
