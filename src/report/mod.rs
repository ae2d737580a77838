pub mod csv;
pub mod json;
pub mod junit;

use anyhow::{Context, Result};
use std::path::Path;

use crate::runner::state::ExecutionReport;

/// Output formats for a stored execution report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Junit,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "junit" | "xml" => Ok(ReportFormat::Junit),
            "csv" => Ok(ReportFormat::Csv),
            other => anyhow::bail!("Unknown format: {}", other),
        }
    }
}

/// Read an execution report written by `json::write_report`
pub fn load_report(path: &Path) -> Result<ExecutionReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not an execution report", path.display()))
}

/// Render a stored report. Prints to stdout when `output` is `None`.
pub fn generate_report(results_path: &Path, format: ReportFormat, output: Option<&Path>) -> Result<()> {
    let report = load_report(results_path)?;

    let rendered = match format {
        ReportFormat::Json => json::to_json(&report)?,
        ReportFormat::Junit => junit::generate_junit_xml(&report)?,
        ReportFormat::Csv => csv::results_to_csv(&report)?,
    };

    if let Some(path) = output {
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    } else {
        println!("{}", rendered);
    }
    Ok(())
}
