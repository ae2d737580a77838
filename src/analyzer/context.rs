use serde::Serialize;
use std::fmt::Write;

/// Links listed in the context document before the rest are summarized
pub const MAX_LISTED_LINKS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormInput {
    /// `type` attribute, or the tag name for textarea/select
    pub kind: String,
    pub name: String,
    pub placeholder: String,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ButtonInfo {
    pub text: String,
    pub kind: String,
    pub id: String,
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkInfo {
    pub text: String,
    pub href: String,
    pub id: String,
    pub class: String,
}

/// Everything learned about an application's landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppContext {
    pub url: String,
    pub title: String,
    pub description: String,
    pub forms: Vec<FormInfo>,
    pub buttons: Vec<ButtonInfo>,
    pub links: Vec<LinkInfo>,
    pub technologies: Vec<String>,
    pub structure: String,
}

/// Render the context document handed to the AI provider
pub fn format_context(ctx: &AppContext) -> String {
    let mut out = String::new();
    let technologies = if ctx.technologies.is_empty() {
        "None detected".to_string()
    } else {
        ctx.technologies.join(", ")
    };

    // Writing into a String cannot fail
    let _ = write!(
        out,
        "Web Application Analysis Report:\n\n\
         URL: {}\nTitle: {}\nDescription: {}\n\n\
         Structure: {}\n\n\
         Technologies Detected: {}\n\n\
         Forms Found ({}):\n",
        ctx.url,
        ctx.title,
        ctx.description,
        ctx.structure,
        technologies,
        ctx.forms.len()
    );

    for (i, form) in ctx.forms.iter().enumerate() {
        let action = if form.action.is_empty() {
            "same page"
        } else {
            form.action.as_str()
        };
        let _ = write!(out, "\n  Form {}: {} to {}", i + 1, form.method, action);
        for input in &form.inputs {
            let required = if input.required { " (required)" } else { "" };
            let _ = write!(out, "\n    - {} field: {}{}", input.kind, input.name, required);
        }
    }

    let _ = write!(out, "\n\nButtons Found ({}):", ctx.buttons.len());
    for button in &ctx.buttons {
        let _ = write!(out, "\n  - {} ({})", button.text, button.kind);
    }

    let _ = write!(out, "\n\nNavigation Links ({}):", ctx.links.len());
    for link in ctx.links.iter().take(MAX_LISTED_LINKS) {
        let _ = write!(out, "\n  - {} -> {}", link.text, link.href);
    }
    if ctx.links.len() > MAX_LISTED_LINKS {
        let _ = write!(
            out,
            "\n  ... and {} more links",
            ctx.links.len() - MAX_LISTED_LINKS
        );
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minimal_context() {
        let ctx = AppContext {
            url: "http://app.test".into(),
            title: "Home".into(),
            structure: "Basic HTML structure".into(),
            ..Default::default()
        };
        let text = format_context(&ctx);
        assert!(text.starts_with("Web Application Analysis Report:"));
        assert!(text.contains("Technologies Detected: None detected"));
        assert!(text.contains("Forms Found (0):"));
        assert!(text.ends_with("Navigation Links (0):"));
    }

    #[test]
    fn test_format_lists_forms_and_caps_links() {
        let ctx = AppContext {
            url: "http://app.test".into(),
            technologies: vec!["React".into(), "Bootstrap".into()],
            forms: vec![FormInfo {
                action: String::new(),
                method: "POST".into(),
                inputs: vec![FormInput {
                    kind: "email".into(),
                    name: "email".into(),
                    placeholder: String::new(),
                    required: true,
                }],
            }],
            buttons: vec![ButtonInfo {
                text: "Sign in".into(),
                kind: "submit".into(),
                ..Default::default()
            }],
            links: (0..12)
                .map(|i| LinkInfo {
                    text: format!("Page {}", i),
                    href: format!("/p/{}", i),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let text = format_context(&ctx);
        assert!(text.contains("Technologies Detected: React, Bootstrap"));
        assert!(text.contains("Form 1: POST to same page"));
        assert!(text.contains("- email field: email (required)"));
        assert!(text.contains("- Sign in (submit)"));
        assert!(text.contains("- Page 9 -> /p/9"));
        assert!(!text.contains("/p/10"));
        assert!(text.contains("... and 2 more links"));
    }
}
