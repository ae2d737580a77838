use std::time::Duration;

use super::Outcome;
use crate::driver::http::HttpProbe;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Responses at or above this latency fail
pub const LATENCY_THRESHOLD: Duration = Duration::from_secs(5);

/// Timed GET against `base_url`. Network errors become a failed outcome.
pub async fn run(http: &dyn HttpProbe, base_url: &str) -> Outcome {
    let response = match http.get(base_url, REQUEST_TIMEOUT).await {
        Ok(response) => response,
        Err(e) => return Outcome::fail(format!("Performance test failed: {:#}", e)),
    };

    let seconds = response.elapsed.as_secs_f64();
    if response.status != 200 {
        Outcome::fail(format!(
            "Performance test failed - page returned error {} after {:.2}s",
            response.status, seconds
        ))
    } else if response.elapsed >= LATENCY_THRESHOLD {
        Outcome::fail(format!(
            "Performance test failed - page took {:.2}s to load (threshold {:.1}s)",
            seconds,
            LATENCY_THRESHOLD.as_secs_f64()
        ))
    } else {
        Outcome::pass(format!(
            "Performance test passed - page loaded in {:.2}s",
            seconds
        ))
    }
}
