//! Application analysis
//!
//! Loads the landing page of a web application and describes what it finds
//! (forms, buttons, links, technologies, landmark structure) as a plain-text
//! context document for test generation.

pub mod context;
pub mod detect;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub use context::{format_context, AppContext, ButtonInfo, FormInfo, FormInput, LinkInfo};
pub use detect::{detect_technologies, structure_summary};

use crate::driver::http::{HttpProbe, ReqwestProbe};
use crate::driver::session::SessionGuard;
use crate::driver::traits::{BrowserSession, ElementRef, SessionLauncher};
use crate::driver::web::PlaywrightLauncher;
use crate::utils::config::BrowserConfig;

pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

const SKIPPED_LINK_PREFIXES: &[&str] = &["http", "mailto:", "tel:"];

pub struct AppAnalyzer {
    launcher: Arc<dyn SessionLauncher>,
    http: Arc<dyn HttpProbe>,
    browser: BrowserConfig,
}

impl AppAnalyzer {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        http: Arc<dyn HttpProbe>,
        browser: BrowserConfig,
    ) -> Self {
        Self {
            launcher,
            http,
            browser,
        }
    }

    /// Analyzer backed by Playwright Chromium and reqwest
    pub fn with_defaults(browser: BrowserConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(PlaywrightLauncher),
            Arc::new(ReqwestProbe::new()?),
            browser,
        ))
    }

    /// Analyze `url` and render the context document
    pub async fn analyze(&self, url: &str) -> Result<String> {
        let ctx = self.analyze_context(url).await?;
        Ok(format_context(&ctx))
    }

    pub async fn analyze_context(&self, url: &str) -> Result<AppContext> {
        self.inspect(url).await.context("Failed to analyze app")
    }

    async fn inspect(&self, url: &str) -> Result<AppContext> {
        let response = self.http.get(url, PREFLIGHT_TIMEOUT).await?;
        if response.status != 200 {
            anyhow::bail!("App not accessible. Status code: {}", response.status);
        }

        log::info!("Analyzing {}", url);
        let guard = SessionGuard::open(self.launcher.as_ref(), &self.browser, url).await?;
        let extracted = extract(guard.session(), url).await;
        guard.release().await;
        extracted
    }
}

async fn extract(session: &dyn BrowserSession, url: &str) -> Result<AppContext> {
    let title = session.title().await?;
    let source = session.content().await?;

    let description = match session.find_all("meta[name='description']").await?.first() {
        Some(meta) => attr(session, *meta, "content").await,
        None => String::new(),
    };

    let ctx = AppContext {
        url: url.to_string(),
        title,
        description,
        forms: extract_forms(session).await?,
        buttons: extract_buttons(session).await?,
        links: extract_links(session).await?,
        technologies: detect_technologies(&source),
        structure: structure_summary(session).await?,
    };
    log::debug!(
        "Found {} forms, {} buttons, {} links",
        ctx.forms.len(),
        ctx.buttons.len(),
        ctx.links.len()
    );
    Ok(ctx)
}

/// Attribute value, empty when missing or unreadable
async fn attr(session: &dyn BrowserSession, element: ElementRef, name: &str) -> String {
    session
        .attribute(element, name)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn extract_forms(session: &dyn BrowserSession) -> Result<Vec<FormInfo>> {
    let mut forms = Vec::new();
    for form in session.find_all("form").await? {
        let method = session
            .attribute(form, "method")
            .await?
            .unwrap_or_else(|| "GET".to_string());

        let mut inputs = Vec::new();
        for tag in ["input", "textarea", "select"] {
            for field in session.find_within(form, tag).await? {
                let kind = session
                    .attribute(field, "type")
                    .await?
                    .unwrap_or_else(|| tag.to_string());
                inputs.push(FormInput {
                    kind,
                    name: attr(session, field, "name").await,
                    placeholder: attr(session, field, "placeholder").await,
                    required: session.attribute(field, "required").await?.is_some(),
                });
            }
        }

        forms.push(FormInfo {
            action: attr(session, form, "action").await,
            method,
            inputs,
        });
    }
    Ok(forms)
}

async fn extract_buttons(session: &dyn BrowserSession) -> Result<Vec<ButtonInfo>> {
    let mut buttons = Vec::new();
    for button in session.find_all("button").await? {
        let text = session.text(button).await.unwrap_or_default();
        let kind = session
            .attribute(button, "type")
            .await?
            .unwrap_or_else(|| "button".to_string());
        buttons.push(ButtonInfo {
            text: text.trim().to_string(),
            kind,
            id: attr(session, button, "id").await,
            class: attr(session, button, "class").await,
        });
    }
    for input in session
        .find_all("input[type='submit'], input[type='button']")
        .await?
    {
        buttons.push(ButtonInfo {
            text: attr(session, input, "value").await,
            kind: attr(session, input, "type").await,
            id: attr(session, input, "id").await,
            class: attr(session, input, "class").await,
        });
    }
    Ok(buttons)
}

/// In-app links only: absolute, mail and phone links are skipped
async fn extract_links(session: &dyn BrowserSession) -> Result<Vec<LinkInfo>> {
    let mut links = Vec::new();
    for anchor in session.find_all("a[href]").await? {
        let href = attr(session, anchor, "href").await;
        if href.is_empty() || SKIPPED_LINK_PREFIXES.iter().any(|p| href.starts_with(p)) {
            continue;
        }
        let text = session.text(anchor).await.unwrap_or_default();
        links.push(LinkInfo {
            text: text.trim().to_string(),
            href,
            id: attr(session, anchor, "id").await,
            class: attr(session, anchor, "class").await,
        });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{FakeElement, FakeHttpProbe, FakeLauncher, FakePage};

    fn analyzer(page: FakePage, http: FakeHttpProbe) -> (AppAnalyzer, Arc<FakeLauncher>) {
        let launcher = Arc::new(FakeLauncher::new(page));
        let analyzer = AppAnalyzer::new(
            launcher.clone(),
            Arc::new(http),
            FakeLauncher::fast_config(),
        );
        (analyzer, launcher)
    }

    fn login_page() -> FakePage {
        FakePage::new(
            "Shop",
            r#"<html><body class="container-fluid"><script src="react-dom.js"></script></body></html>"#,
        )
        .with(FakeElement::new("meta").attr("name", "description").attr("content", "Online shop"))
        .with(FakeElement::new("form").attr("action", "/login").attr("method", "post"))
        .with(FakeElement::new("input").attr("type", "email").attr("name", "email").attr("required", "").inside(1))
        .with(FakeElement::new("textarea").attr("name", "note").inside(1))
        .with(FakeElement::new("button").attr("type", "submit").text(" Sign in "))
        .with(FakeElement::new("input").attr("type", "button").attr("value", "Cancel"))
        .with(FakeElement::new("a").attr("href", "/about").text("About"))
        .with(FakeElement::new("a").attr("href", "https://elsewhere.test").text("External"))
        .with(FakeElement::new("a").attr("href", "mailto:help@shop.test"))
        .with(FakeElement::new("header"))
    }

    #[tokio::test]
    async fn test_analyze_extracts_page_structure() {
        let (analyzer, launcher) = analyzer(login_page(), FakeHttpProbe::ok());
        let ctx = analyzer.analyze_context("http://shop.test").await.unwrap();

        assert_eq!(ctx.title, "Shop");
        assert_eq!(ctx.description, "Online shop");
        assert_eq!(ctx.forms.len(), 1);
        assert_eq!(ctx.forms[0].method, "post");
        assert_eq!(ctx.forms[0].action, "/login");
        assert_eq!(
            ctx.forms[0].inputs,
            vec![
                FormInput {
                    kind: "email".into(),
                    name: "email".into(),
                    placeholder: String::new(),
                    required: true,
                },
                FormInput {
                    kind: "textarea".into(),
                    name: "note".into(),
                    placeholder: String::new(),
                    required: false,
                },
            ]
        );
        let buttons: Vec<_> = ctx.buttons.iter().map(|b| (b.text.as_str(), b.kind.as_str())).collect();
        assert_eq!(buttons, vec![("Sign in", "submit"), ("Cancel", "button")]);
        assert_eq!(ctx.links.len(), 1);
        assert_eq!(ctx.links[0].href, "/about");
        assert_eq!(ctx.technologies, vec!["React", "Bootstrap"]);
        assert_eq!(ctx.structure, "Header/Navigation section present");
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_analyze_renders_context_document() {
        let (analyzer, _) = analyzer(login_page(), FakeHttpProbe::ok());
        let text = analyzer.analyze("http://shop.test").await.unwrap();
        assert!(text.contains("URL: http://shop.test"));
        assert!(text.contains("Form 1: post to /login"));
    }

    #[tokio::test]
    async fn test_preflight_rejects_non_200() {
        let (analyzer, launcher) = analyzer(
            login_page(),
            FakeHttpProbe::responding(404, Duration::from_millis(5), &[]),
        );
        let err = analyzer.analyze("http://shop.test").await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Failed to analyze app"));
        assert!(message.contains("App not accessible. Status code: 404"));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_navigation_error_releases_session() {
        let (analyzer, launcher) = analyzer(login_page().failing_navigation(), FakeHttpProbe::ok());
        assert!(analyzer.analyze("http://shop.test").await.is_err());
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.closes(), 1);
    }
}
