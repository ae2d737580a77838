pub mod classify;
pub mod events;
pub mod executor;
pub mod state;

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub use classify::{classify, FunctionalCheck, Strategy, UiCheck};
pub use events::*;
pub use executor::{ExecutionError, TestExecutor, DEFAULT_LIMIT};
pub use state::*;

use crate::parser::types::TestCaseSpec;
use crate::report;
use crate::utils::config::BrowserConfig;

/// Extra report files written next to `execution_history.json`
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub junit: bool,
    pub csv: bool,
}

/// Execute test cases with the real browser and console output, then write
/// reports into `output`
pub async fn run_tests(
    cases: &[TestCaseSpec],
    base_url: &str,
    limit: usize,
    browser: &BrowserConfig,
    output: &Path,
    reports: &ReportOptions,
) -> Result<ExecutionReport> {
    let executor = TestExecutor::with_defaults(browser.clone())?;
    let listener = tokio::spawn(ConsoleEventListener::listen(executor.subscribe()));

    let outcome = executor.execute_top_tests(cases, base_url, limit).await;
    // Closing the channel lets the listener drain and exit
    drop(executor);
    let _ = listener.await;
    let report = outcome?;

    for path in write_reports(&report, output, reports)? {
        println!("    {} Report: {}", "ℹ".blue(), path.display());
    }
    Ok(report)
}

pub fn write_reports(
    report: &ExecutionReport,
    output: &Path,
    options: &ReportOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = vec![report::json::write_report(report, output)?];
    if options.junit {
        written.push(report::junit::write_report(report, output)?);
    }
    if options.csv {
        let path = output.join("execution_results.csv");
        report::csv::write_results(report, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::junit::tests::sample_report;

    #[test]
    fn test_write_reports_honours_options() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();

        let written = write_reports(&report, dir.path(), &ReportOptions::default()).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("execution_history.json"));

        let written = write_reports(
            &report,
            dir.path(),
            &ReportOptions {
                junit: true,
                csv: true,
            },
        )
        .unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("junit.xml").exists());
        assert!(dir.path().join("execution_results.csv").exists());
    }
}
