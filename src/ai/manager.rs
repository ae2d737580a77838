use serde_json::Value;

use super::{AiProvider, ClaudeProvider, GeminiProvider, ProviderError, ProviderInfo};
use crate::parser::types::TestCaseSpec;
use crate::utils::config::Config;

/// Registry of providers, in fallback order
pub struct ProviderManager {
    providers: Vec<Box<dyn AiProvider>>,
    default_provider: String,
}

impl ProviderManager {
    pub fn new(providers: Vec<Box<dyn AiProvider>>, default_provider: &str) -> Self {
        Self {
            providers,
            default_provider: default_provider.to_lowercase(),
        }
    }

    /// Claude then Gemini, keyed from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            vec![
                Box::new(ClaudeProvider::new(config.anthropic_api_key.clone())),
                Box::new(GeminiProvider::new(config.gemini_api_key.clone())),
            ],
            &config.default_provider,
        )
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Resolve a provider by name (the default when `None`). An unavailable
    /// provider falls back to the first available one in registration order.
    pub fn get_provider(&self, name: Option<&str>) -> Result<&dyn AiProvider, ProviderError> {
        let requested = name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.default_provider.clone());

        let provider = self
            .providers
            .iter()
            .find(|p| p.key() == requested)
            .ok_or_else(|| ProviderError::Unknown(requested.clone()))?;
        if provider.is_available() {
            return Ok(provider.as_ref());
        }

        match self.providers.iter().find(|p| p.is_available()) {
            Some(fallback) => {
                log::warn!(
                    "Provider {} not available, using {} instead",
                    requested,
                    fallback.key()
                );
                Ok(fallback.as_ref())
            }
            None => Err(ProviderError::NoneAvailable(requested)),
        }
    }

    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        self.providers.iter().map(|p| p.info()).collect()
    }

    /// Generate test cases, returning them with the key of the provider
    /// that actually answered
    pub async fn generate_test_cases(
        &self,
        context: &str,
        provider: Option<&str>,
        template: Option<&Value>,
    ) -> Result<(Vec<TestCaseSpec>, &'static str), ProviderError> {
        let provider = self.get_provider(provider)?;
        log::info!("Generating test cases with {}", provider.info().name);
        let cases = provider.generate(context, template).await?;
        Ok((cases, provider.key()))
    }
}
