use anyhow::Result;

use crate::driver::traits::BrowserSession;

/// Technology name and the page-source substrings that reveal it
const TECH_INDICATORS: &[(&str, &[&str])] = &[
    ("React", &["react", "jsx", "react-dom"]),
    ("Angular", &["angular", "ng-app", "ng-controller"]),
    ("Vue.js", &["vue", "v-if", "v-for"]),
    ("Bootstrap", &["bootstrap", "btn-primary", "container-fluid"]),
    ("jQuery", &["jquery", "$(", "jquery.min.js"]),
    ("Express.js", &["express"]),
    ("Flask", &["flask"]),
    ("Django", &["django", "csrfmiddlewaretoken"]),
];

/// Technologies whose indicators appear in the page source, in table order
pub fn detect_technologies(page_source: &str) -> Vec<String> {
    let source = page_source.to_lowercase();
    TECH_INDICATORS
        .iter()
        .filter(|(_, indicators)| indicators.iter().any(|i| source.contains(i)))
        .map(|(tech, _)| tech.to_string())
        .collect()
}

/// Landmark selectors, tried in order; the first match of a group counts
const STRUCTURE_LANDMARKS: &[(&[&str], &str)] = &[
    (&["header", "nav"], "Header/Navigation section present"),
    (&["main", "div[class*='main' i]"], "Main content area identified"),
    (&["aside", "div[class*='sidebar' i]"], "Sidebar present"),
    (&["footer"], "Footer section present"),
];

/// One-line summary of the page's landmark regions
pub async fn structure_summary(session: &dyn BrowserSession) -> Result<String> {
    let mut found = Vec::new();
    for (selectors, label) in STRUCTURE_LANDMARKS {
        for selector in *selectors {
            if !session.find_all(selector).await?.is_empty() {
                found.push(*label);
                break;
            }
        }
    }

    Ok(if found.is_empty() {
        "Basic HTML structure".to_string()
    } else {
        found.join("; ")
    })
}
