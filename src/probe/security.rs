use std::time::Duration;

use super::Outcome;
use crate::driver::http::HttpProbe;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const SECURITY_HEADERS: [&str; 3] =
    ["X-Content-Type-Options", "X-Frame-Options", "X-XSS-Protection"];

/// Passes when the response carries at least one of `SECURITY_HEADERS`
pub async fn run(http: &dyn HttpProbe, base_url: &str) -> Outcome {
    let response = match http.get(base_url, REQUEST_TIMEOUT).await {
        Ok(response) => response,
        Err(e) => return Outcome::fail(format!("Security test failed: {:#}", e)),
    };

    // HeaderMap lookups ignore case
    let found: Vec<&str> = SECURITY_HEADERS
        .iter()
        .copied()
        .filter(|name| response.headers.contains_key(*name))
        .collect();

    if found.is_empty() {
        Outcome::fail("Security test failed - no common security headers found")
    } else {
        Outcome::pass(format!(
            "Security test passed - found {} security headers ({})",
            found.len(),
            found.join(", ")
        ))
    }
}
