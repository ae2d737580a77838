//! Test classifier
//!
//! Maps a test case's declared category and free-text name onto one of the
//! fixed execution strategies. Name rules are ordered and the first match
//! wins; reordering them changes which check runs.

use crate::parser::types::TestCaseSpec;

/// Which functional check a test name selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionalCheck {
    PageLoad,
    Navigation,
    Form,
    Button,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCheck {
    Responsive,
    Generic,
}

/// Execution strategy chosen for one test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Functional(FunctionalCheck),
    Ui(UiCheck),
    Performance,
    Security,
}

const FUNCTIONAL_RULES: &[(&str, FunctionalCheck)] = &[
    ("page load", FunctionalCheck::PageLoad),
    ("loading", FunctionalCheck::PageLoad),
    ("navigation", FunctionalCheck::Navigation),
    ("form", FunctionalCheck::Form),
    ("button", FunctionalCheck::Button),
];

const UI_RULES: &[(&str, UiCheck)] = &[
    ("responsive", UiCheck::Responsive),
    ("mobile", UiCheck::Responsive),
];

fn first_match<T: Copy>(rules: &[(&str, T)], name: &str, fallback: T) -> T {
    rules
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, check)| *check)
        .unwrap_or(fallback)
}

/// Pick the strategy for a category and test name. Unknown categories run
/// the functional checks.
pub fn classify(category: &str, name: &str) -> Strategy {
    let name = name.to_lowercase();
    match category.trim().to_lowercase().as_str() {
        "ui" => Strategy::Ui(first_match(UI_RULES, &name, UiCheck::Generic)),
        "performance" => Strategy::Performance,
        "security" => Strategy::Security,
        _ => Strategy::Functional(first_match(
            FUNCTIONAL_RULES,
            &name,
            FunctionalCheck::Generic,
        )),
    }
}

pub fn classify_spec(spec: &TestCaseSpec) -> Strategy {
    classify(spec.category_label(), &spec.display_name())
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Functional(check) => write!(f, "functional/{:?}", check),
            Strategy::Ui(check) => write!(f, "ui/{:?}", check),
            Strategy::Performance => f.write_str("performance"),
            Strategy::Security => f.write_str("security"),
        }
    }
}
