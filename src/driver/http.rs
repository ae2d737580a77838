//! Plain HTTP probing used by checks that do not need a browser

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Outcome of a single timed GET
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Time until the full body was received
    pub elapsed: Duration,
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse>;
}

/// `HttpProbe` backed by reqwest
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("scout-tester/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        let elapsed = start.elapsed();

        log::debug!("GET {} -> {} in {:?}", url, status, elapsed);
        Ok(ProbeResponse {
            status,
            headers,
            elapsed,
        })
    }
}
