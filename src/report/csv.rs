//! CSV exports of generated test cases and execution results

use anyhow::{Context, Result};
use std::path::Path;

use crate::parser::types::TestCaseSpec;
use crate::runner::state::ExecutionReport;

const TEST_CASE_HEADERS: [&str; 9] = [
    "ID",
    "Test Case Name",
    "Description",
    "Priority",
    "Category",
    "Test Steps",
    "Expected Result",
    "Test Data",
    "Estimated Time",
];

const RESULT_HEADERS: [&str; 9] = [
    "Test ID",
    "Test Name",
    "Category",
    "Priority",
    "Status",
    "Execution Time",
    "Details",
    "Error",
    "Timestamp",
];

fn numbered_steps(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().context("Failed to flush CSV")?;
    Ok(String::from_utf8(bytes)?)
}

pub fn test_cases_to_csv(cases: &[TestCaseSpec]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TEST_CASE_HEADERS)?;

    for case in cases {
        let test_data = if case.test_data.as_object().map_or(false, |m| m.is_empty()) {
            String::new()
        } else {
            serde_json::to_string_pretty(&case.test_data)?
        };
        writer.write_record([
            case.test_id().to_string(),
            case.display_name(),
            case.description.clone().unwrap_or_default(),
            case.priority_label().to_string(),
            case.category_label().to_string(),
            numbered_steps(&case.steps),
            case.expected_result.clone().unwrap_or_default(),
            test_data,
            case.estimated_time.clone().unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

pub fn results_to_csv(report: &ExecutionReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RESULT_HEADERS)?;

    for result in &report.results {
        writer.write_record([
            result.test_id.to_string(),
            result.test_name.clone(),
            result.category.clone(),
            result.priority.clone(),
            result.status.as_str().to_uppercase(),
            result.execution_time.clone(),
            result.details.clone(),
            result.error.clone().unwrap_or_default(),
            result.timestamp.clone(),
        ])?;
    }

    finish(writer)
}

pub fn write_test_cases(cases: &[TestCaseSpec], path: &Path) -> Result<()> {
    std::fs::write(path, test_cases_to_csv(cases)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_results(report: &ExecutionReport, path: &Path) -> Result<()> {
    std::fs::write(path, results_to_csv(report)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::junit::tests::sample_report;
    use serde_json::json;

    #[test]
    fn test_test_cases_csv_numbers_steps() {
        let cases = vec![TestCaseSpec::from_value(
            1,
            &json!({
                "name": "Login, happy path",
                "priority": "High",
                "steps": ["Open login", "Submit"],
                "test_data": {"user": "demo"}
            }),
        )];
        let csv = test_cases_to_csv(&cases).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[1], "Test Case Name");

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "1");
        assert_eq!(&row[1], "Login, happy path");
        assert_eq!(&row[4], "Functional");
        assert_eq!(&row[5], "1. Open login\n2. Submit");
        assert!(row[7].contains("\"user\": \"demo\""));
    }

    #[test]
    fn test_results_csv_has_one_row_per_result() {
        let csv = results_to_csv(&sample_report()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][4], "PASSED");
        assert_eq!(&rows[1][4], "FAILED");
    }
}
