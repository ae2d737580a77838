use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::types::TestCaseSpec;

/// Parse a list of test case records.
///
/// Accepts a bare array or an object carrying a `test_cases` array. Individual
/// records never fail the batch; only a document with no list at all does.
pub fn parse_test_cases(document: &Value) -> Result<Vec<TestCaseSpec>> {
    let records = match document {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("test_cases")
            .and_then(Value::as_array)
            .context("Expected a `test_cases` array in the document")?,
        _ => anyhow::bail!("Expected a JSON array of test cases"),
    };

    Ok(records
        .iter()
        .enumerate()
        .map(|(i, record)| TestCaseSpec::from_value(i + 1, record))
        .collect())
}

/// Load test cases from a JSON or YAML file
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCaseSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases from {}", path.display()))?;

    let is_yaml = path
        .extension()
        .map_or(false, |ext| ext == "yaml" || ext == "yml");

    let document: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))?
    };

    parse_test_cases(&document)
}
