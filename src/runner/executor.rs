use anyhow::Result;
use chrono::Local;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::classify::classify_spec;
use super::events::{EventEmitter, TestEvent};
use super::state::{ExecutionReport, ExecutionResult};
use crate::driver::http::{HttpProbe, ReqwestProbe};
use crate::driver::traits::SessionLauncher;
use crate::driver::web::PlaywrightLauncher;
use crate::parser::types::TestCaseSpec;
use crate::probe::{self, ProbeContext};
use crate::utils::config::BrowserConfig;

pub const DEFAULT_LIMIT: usize = 10;

/// Failures that reject a whole batch before any test runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Base URL is empty")]
    EmptyBaseUrl,
    #[error("Base URL must be an absolute http(s) URL: {0}")]
    InvalidBaseUrl(String),
}

/// Runs test cases one after another, each against a fresh browser session
pub struct TestExecutor {
    launcher: Arc<dyn SessionLauncher>,
    http: Arc<dyn HttpProbe>,
    browser: BrowserConfig,
    emitter: EventEmitter,
}

impl TestExecutor {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        http: Arc<dyn HttpProbe>,
        browser: BrowserConfig,
    ) -> Self {
        Self {
            launcher,
            http,
            browser,
            emitter: EventEmitter::default(),
        }
    }

    /// Executor backed by Playwright Chromium and reqwest
    pub fn with_defaults(browser: BrowserConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(PlaywrightLauncher),
            Arc::new(ReqwestProbe::new()?),
            browser,
        ))
    }

    /// Subscribe to execution events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    /// Highest-priority test cases first, at most `limit` of them. Ties keep
    /// their input order.
    pub fn select_tests(test_cases: &[TestCaseSpec], limit: usize) -> Vec<&TestCaseSpec> {
        let mut sorted: Vec<&TestCaseSpec> = test_cases.iter().collect();
        // sort_by is stable
        sorted.sort_by(|a, b| b.priority_weight().cmp(&a.priority_weight()));
        sorted.truncate(limit);
        sorted
    }

    /// Execute the top `limit` test cases against `base_url`.
    ///
    /// Only an unusable base URL is an error; a zero limit yields an empty
    /// report. Every individual test outcome, including crashes, ends up as
    /// a result in the report.
    pub async fn execute_top_tests(
        &self,
        test_cases: &[TestCaseSpec],
        base_url: &str,
        limit: usize,
    ) -> std::result::Result<ExecutionReport, ExecutionError> {
        let base_url = validate_base_url(base_url)?;

        let selected = Self::select_tests(test_cases, limit);
        log::info!(
            "Executing {} of {} test cases against {}",
            selected.len(),
            test_cases.len(),
            base_url
        );
        self.emitter.emit(TestEvent::BatchStarted {
            base_url: base_url.to_string(),
            available: test_cases.len(),
            selected: selected.len(),
        });

        let started_at = Local::now();
        let start = Instant::now();
        let total = selected.len();
        let mut results = Vec::with_capacity(total);

        for (i, spec) in selected.into_iter().enumerate() {
            self.emitter.emit(TestEvent::TestStarted {
                index: i + 1,
                total,
                test_name: spec.display_name(),
                strategy: classify_spec(spec).to_string(),
            });

            let result = self.execute_single_test(spec, base_url).await;

            self.emitter.emit(TestEvent::TestFinished {
                index: i + 1,
                result: result.clone(),
            });
            results.push(result);
        }

        let report = ExecutionReport::assemble(started_at, start.elapsed(), results);
        log::info!(
            "Execution finished: {} passed, {} failed in {}",
            report.summary.passed,
            report.summary.failed,
            report.summary.execution_time
        );
        self.emitter.emit(TestEvent::BatchFinished {
            summary: report.summary.clone(),
        });
        Ok(report)
    }

    /// Execute one test case. Never fails: errors and panics inside the
    /// executor become a failed result.
    pub async fn execute_single_test(&self, spec: &TestCaseSpec, base_url: &str) -> ExecutionResult {
        let mut result = ExecutionResult::start(spec);
        let strategy = classify_spec(spec);
        let start = Instant::now();

        log::debug!("Running '{}' as {}", result.test_name, strategy);

        let ctx = ProbeContext {
            launcher: self.launcher.as_ref(),
            http: self.http.as_ref(),
            browser: &self.browser,
        };
        let outcome = AssertUnwindSafe(probe::run(ctx, strategy, base_url))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(outcome)) if outcome.passed => result.pass(outcome.details),
            Ok(Ok(outcome)) => result.fail(outcome.details),
            Ok(Err(e)) => {
                log::warn!("'{}' failed with error: {:#}", result.test_name, e);
                result.error(format!("{:#}", e));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log::error!("'{}' panicked: {}", result.test_name, message);
                result.error(message);
            }
        }

        result.finish(start.elapsed());
        result
    }
}

fn validate_base_url(raw: &str) -> std::result::Result<&str, ExecutionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyBaseUrl);
    }
    let url = reqwest::Url::parse(trimmed)
        .map_err(|_| ExecutionError::InvalidBaseUrl(trimmed.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ExecutionError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(trimmed)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: unknown cause".to_string()
    }
}
