//! Test case generation through LLM providers
//!
//! Each provider turns a context document into a list of test cases. When a
//! provider answers with something that cannot be parsed, the single
//! fallback test case is returned instead of an error.

pub mod claude;
pub mod gemini;
pub mod manager;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::parser::types::TestCaseSpec;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use manager::ProviderManager;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    Unknown(String),

    #[error("{0} API key not configured")]
    NotConfigured(&'static str),

    #[error("Provider {0} is not available and no fallback found")]
    NoneAvailable(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout)
    #[error("Failed to generate test cases using {provider} API: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-2xx status
    #[error("Failed to generate test cases using {provider} API ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Empty response from {0} API")]
    EmptyResponse(&'static str),
}

/// Static description of a provider, as listed to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub model: &'static str,
    pub description: &'static str,
    pub available: bool,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Lower-case registry key, e.g. `"claude"`
    fn key(&self) -> &'static str;

    fn info(&self) -> ProviderInfo;

    /// Whether the provider has the credentials it needs
    fn is_available(&self) -> bool;

    /// Generate test cases for a context document. `template` is optional
    /// extra structure appended to the prompt.
    async fn generate(
        &self,
        context: &str,
        template: Option<&Value>,
    ) -> Result<Vec<TestCaseSpec>, ProviderError>;
}
