//! Per-session artifact storage
//!
//! Generated test cases and execution reports are persisted under
//! `<root>/<session_id>/` so they can be downloaded later.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::parser::types::TestCaseSpec;
use crate::runner::state::ExecutionReport;

/// Files kept for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    TestCases,
    Execution,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::TestCases => "test_cases.json",
            Artifact::Execution => "execution_history.json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Directory for a session. Only UUID ids are accepted so an id can never
    /// escape the store root.
    pub fn session_dir(&self, session_id: &str) -> Result<PathBuf> {
        let id = Uuid::parse_str(session_id)
            .with_context(|| format!("Invalid session id: {}", session_id))?;
        Ok(self.root.join(id.to_string()))
    }

    pub fn artifact_path(&self, session_id: &str, artifact: Artifact) -> Result<PathBuf> {
        Ok(self.session_dir(session_id)?.join(artifact.file_name()))
    }

    pub fn save_test_cases(&self, session_id: &str, cases: &[TestCaseSpec]) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(cases)?;
        self.write(session_id, Artifact::TestCases, json)
    }

    pub fn save_execution(&self, session_id: &str, report: &ExecutionReport) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(report)?;
        self.write(session_id, Artifact::Execution, json)
    }

    /// Read a stored artifact; `None` when it was never written
    pub fn read_artifact(&self, session_id: &str, artifact: Artifact) -> Result<Option<Vec<u8>>> {
        let path = self.artifact_path(session_id, artifact)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn write(&self, session_id: &str, artifact: Artifact, contents: String) -> Result<PathBuf> {
        let dir = self.session_dir(session_id)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        let path = dir.join(artifact.file_name());
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Saved {} for session {}", artifact.file_name(), session_id);
        Ok(path)
    }
}
