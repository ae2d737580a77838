use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::parser::types::TestCaseSpec;

/// Terminal status of one executed test. There is deliberately no separate
/// error state: an execution error is a failure with `error` populated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result record for a single test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    pub test_id: i64,
    pub test_name: String,
    pub category: String,
    pub priority: String,
    pub status: TestStatus,
    /// Seconds with two decimals, e.g. `"1.25s"`
    pub execution_time: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl ExecutionResult {
    /// Fresh record for `spec`. Starts out failed until an executor says otherwise.
    pub fn start(spec: &TestCaseSpec) -> Self {
        Self {
            test_id: spec.test_id(),
            test_name: spec.display_name(),
            category: spec.category_label().to_string(),
            priority: spec.priority_label().to_string(),
            status: TestStatus::Failed,
            execution_time: format_seconds(Duration::ZERO),
            details: String::new(),
            error: None,
            timestamp: Local::now().to_rfc3339(),
        }
    }

    pub fn pass(&mut self, details: impl Into<String>) {
        self.status = TestStatus::Passed;
        self.details = details.into();
    }

    pub fn fail(&mut self, details: impl Into<String>) {
        self.status = TestStatus::Failed;
        self.details = details.into();
    }

    /// Record an execution error that escaped the executor
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = TestStatus::Failed;
        self.details = format!("Test execution failed: {}", message);
        self.error = Some(message);
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.execution_time = format_seconds(elapsed);
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// Wall-clock duration of the whole batch
    pub execution_time: String,
    /// Batch start
    pub timestamp: String,
}

/// Complete output of one batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionReport {
    pub summary: ExecutionSummary,
    pub results: Vec<ExecutionResult>,
}

impl ExecutionReport {
    /// Build the summary block over `results`, keeping their order
    pub fn assemble(
        started_at: DateTime<Local>,
        elapsed: Duration,
        results: Vec<ExecutionResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.is_passed()).count();
        let summary = ExecutionSummary {
            total_tests: results.len(),
            passed,
            failed: results.len() - passed,
            execution_time: format_seconds(elapsed),
            timestamp: started_at.to_rfc3339(),
        };
        Self { summary, results }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

pub fn format_seconds(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
