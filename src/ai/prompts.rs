use serde_json::Value;

const CLAUDE_WEB_PROMPT: &str = r#"Based on the following web application analysis, generate comprehensive test cases for testing this application.

Application Context:
{context}

Please generate test cases that cover:
1. Functional testing (forms, buttons, navigation)
2. UI/UX testing (layout, responsiveness)
3. Data validation testing
4. Error handling testing
5. Security testing (basic)
6. Performance testing (basic)
7. Accessibility testing (basic)

For each test case, provide:
- name: A clear, descriptive name
- description: What the test case validates
- priority: High/Medium/Low
- category: Functional/UI/Security/Performance/Accessibility/Data Validation/Error Handling
- steps: Detailed step-by-step instructions
- expected_result: What should happen when the test passes
- test_data: Any specific data needed for the test (if applicable)

Please format your response as a valid JSON array of test case objects. Ensure the JSON is properly formatted and parseable.

Example format:
[
  {
    "name": "Login Form Validation",
    "description": "Verify that login form validates required fields",
    "priority": "High",
    "category": "Functional",
    "steps": [
      "Navigate to login page",
      "Leave username field empty",
      "Leave password field empty",
      "Click submit button"
    ],
    "expected_result": "Form should display validation errors for both fields",
    "test_data": {
      "username": "",
      "password": ""
    }
  }
]

Generate at least 15-20 comprehensive test cases covering all aspects of the application.
"#;

const GEMINI_WEB_PROMPT: &str = r#"You are a QA expert tasked with creating comprehensive test cases for a web application.

Application Analysis:
{context}

Generate test cases covering these categories:
1. Functional Testing: Forms, buttons, navigation, core features
2. UI/UX Testing: Layout, responsiveness, visual elements
3. Data Validation: Input validation, form validation, data integrity
4. Error Handling: Invalid inputs, edge cases, error messages
5. Security Testing: Basic security checks, XSS prevention, authentication
6. Performance Testing: Page load times, response times
7. Accessibility Testing: Screen readers, keyboard navigation

For each test case, provide these fields:
- name: Clear, descriptive test name
- description: What the test validates
- priority: "High", "Medium", or "Low"
- category: One of the categories above
- steps: Array of detailed step-by-step instructions
- expected_result: Expected outcome when test passes
- test_data: Object with any test data needed (can be empty {})

IMPORTANT: Respond with ONLY a valid JSON array. No additional text, explanations, or markdown formatting.

Example structure:
[
  {
    "name": "Page Load Validation",
    "description": "Verify the main page loads correctly",
    "priority": "High",
    "category": "Functional",
    "steps": [
      "Navigate to the application URL",
      "Wait for page to fully load",
      "Verify page title is displayed"
    ],
    "expected_result": "Page loads without errors and shows expected content",
    "test_data": {}
  }
]

Generate 15-20 comprehensive test cases as a JSON array:
"#;

fn render(body: &str, context: &str, template: Option<&Value>, template_heading: &str) -> String {
    let mut prompt = body.replacen("{context}", context, 1);
    if let Some(template) = template {
        let pretty = serde_json::to_string_pretty(template).unwrap_or_else(|_| template.to_string());
        prompt.push_str(&format!("\n\n{}:\n{}", template_heading, pretty));
    }
    prompt
}

pub fn claude_prompt(context: &str, template: Option<&Value>) -> String {
    render(CLAUDE_WEB_PROMPT, context, template, "Custom Template Requirements")
}

pub fn gemini_prompt(context: &str, template: Option<&Value>) -> String {
    render(GEMINI_WEB_PROMPT, context, template, "Additional template requirements")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_is_embedded_once() {
        let prompt = claude_prompt("URL: http://app.test", None);
        assert!(prompt.contains("Application Context:\nURL: http://app.test\n"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("Custom Template Requirements"));
    }

    #[test]
    fn test_template_is_appended() {
        let prompt = gemini_prompt("ctx", Some(&json!({"categories": ["security"]})));
        assert!(prompt.contains("Application Analysis:\nctx\n"));
        assert!(prompt.ends_with("Additional template requirements:\n{\n  \"categories\": [\n    \"security\"\n  ]\n}"));
    }
}
