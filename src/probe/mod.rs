//! Category executors
//!
//! Each executor probes the target application for one strategy and decides
//! pass or fail plus a detail line. Functional and UI checks drive a browser
//! session that is opened and released inside the call; performance and
//! security checks use a plain HTTP GET.

pub mod functional;
pub mod performance;
pub mod security;
pub mod ui;

use anyhow::Result;

use crate::driver::http::HttpProbe;
use crate::driver::traits::SessionLauncher;
use crate::runner::classify::Strategy;
use crate::utils::config::BrowserConfig;

/// Verdict of one executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub details: String,
}

impl Outcome {
    pub fn pass(details: impl Into<String>) -> Self {
        Self {
            passed: true,
            details: details.into(),
        }
    }

    pub fn fail(details: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
        }
    }
}

/// Collaborators shared by every executor for the duration of a batch
#[derive(Clone, Copy)]
pub struct ProbeContext<'a> {
    pub launcher: &'a dyn SessionLauncher,
    pub http: &'a dyn HttpProbe,
    pub browser: &'a BrowserConfig,
}

/// Run the executor for `strategy` against `base_url`
pub async fn run(ctx: ProbeContext<'_>, strategy: Strategy, base_url: &str) -> Result<Outcome> {
    match strategy {
        Strategy::Functional(check) => functional::run(ctx, check, base_url).await,
        Strategy::Ui(check) => ui::run(ctx, check, base_url).await,
        Strategy::Performance => Ok(performance::run(ctx.http, base_url).await),
        Strategy::Security => Ok(security::run(ctx.http, base_url).await),
    }
}
