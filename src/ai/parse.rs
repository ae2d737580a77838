//! Turning free-form model output into validated test cases

use serde_json::{json, Value};

use crate::parser::types::{Priority, TestCaseSpec};

/// Slice of `text` from the first `[` to the last `]`, after dropping a
/// leading markdown code fence
pub fn extract_json_array(text: &str) -> Option<&str> {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }

    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    (start < end).then(|| &cleaned[start..=end])
}

/// Parse model output. Anything that is not a JSON array yields the
/// fallback test case.
pub fn parse_response(text: &str) -> Vec<TestCaseSpec> {
    let parsed = extract_json_array(text)
        .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok());

    match parsed {
        Some(records) => validate_test_cases(&records),
        None => {
            log::warn!("Could not parse test cases from model response; using fallback");
            fallback_test_cases()
        }
    }
}

/// Renumber records from 1 and fill every field with its generation default
pub fn validate_test_cases(records: &[Value]) -> Vec<TestCaseSpec> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let position = i + 1;
            let mut spec = TestCaseSpec::from_value(position, record);

            spec.id = Some(position as i64);
            spec.name = Some(spec.display_name());
            spec.description
                .get_or_insert_with(|| "Generated test case".to_string());
            spec.priority = Some(
                spec.priority
                    .as_deref()
                    .and_then(Priority::parse)
                    .unwrap_or(Priority::Medium)
                    .to_string(),
            );
            spec.category
                .get_or_insert_with(|| "Functional".to_string());
            if spec.steps.is_empty() {
                spec.steps = vec!["Execute test".to_string()];
            }
            spec.expected_result
                .get_or_insert_with(|| "Test should pass".to_string());
            spec.estimated_time
                .get_or_insert_with(|| "5 minutes".to_string());
            spec
        })
        .collect()
}

/// The single test case returned when a provider's answer is unusable
pub fn fallback_test_cases() -> Vec<TestCaseSpec> {
    let record = json!({
        "id": 1,
        "name": "Basic Page Load Test",
        "description": "Verify the application loads successfully",
        "priority": "High",
        "category": "Functional",
        "steps": [
            "Open the application URL",
            "Wait for page to load completely",
            "Verify page content is displayed"
        ],
        "expected_result": "Application loads without errors",
        "test_data": {},
        "estimated_time": "2 minutes"
    });
    vec![TestCaseSpec::from_value(1, &record)]
}
