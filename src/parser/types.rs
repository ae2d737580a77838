use serde::Serialize;
use serde_json::{Map, Value};

/// Declared priority of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority label. Matching ignores case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Ordering key used when selecting which tests to run
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight of a raw priority label. Missing or unknown labels weigh the same as `Low`.
pub fn priority_weight(raw: Option<&str>) -> u8 {
    raw.and_then(Priority::parse)
        .map(Priority::weight)
        .unwrap_or(1)
}

/// One AI-authored test case description.
///
/// Every field is optional on the way in; the accessors apply the defaults
/// used throughout execution and reporting. `steps`, `expected_result` and
/// `test_data` are descriptive only and never drive execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// 1-based position of the record in the list it was read from
    #[serde(skip)]
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
    pub test_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

impl TestCaseSpec {
    /// Build a spec from an untrusted JSON record.
    ///
    /// Never fails: a missing or wrong-typed field falls back to its default
    /// and a record that is not an object yields an all-defaults spec.
    pub fn from_value(position: usize, value: &Value) -> Self {
        let field = |key: &str| value.get(key);

        Self {
            id: field("id").and_then(integer_field),
            position,
            name: field("name").and_then(text_field),
            description: field("description").and_then(text_field),
            priority: field("priority").and_then(text_field),
            category: field("category").and_then(text_field),
            steps: field("steps").map(steps_field).unwrap_or_default(),
            expected_result: field("expected_result").and_then(text_field),
            test_data: field("test_data")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            estimated_time: field("estimated_time").and_then(text_field),
        }
    }

    /// Declared id, or the 1-based input position when absent
    pub fn test_id(&self) -> i64 {
        self.id.unwrap_or(self.position as i64)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Test Case {}", self.position))
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("Functional")
    }

    /// Canonical priority label. Missing or unrecognized labels read as `Medium`.
    pub fn priority_label(&self) -> &'static str {
        self.priority
            .as_deref()
            .and_then(Priority::parse)
            .map_or(Priority::Medium.as_str(), Priority::as_str)
    }

    pub fn priority_weight(&self) -> u8 {
        priority_weight(self.priority.as_deref())
    }
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn steps_field(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}
