use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::state::ExecutionReport;
use crate::utils::session::Artifact;

pub fn to_json(report: &ExecutionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write `execution_history.json` into `output_dir`
pub fn write_report(report: &ExecutionReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(Artifact::Execution.file_name());
    std::fs::write(&path, to_json(report)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
