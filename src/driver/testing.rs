//! In-memory test doubles for the session and HTTP traits

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::http::{HttpProbe, ProbeResponse};
use super::traits::{BrowserSession, ElementRef, SessionLauncher};
use crate::utils::config::BrowserConfig;

#[derive(Debug, Clone)]
pub struct FakeElement {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    enabled: bool,
    visible: bool,
    hidden_below_width: Option<u32>,
    parent: Option<usize>,
    click_fails: bool,
    fill_fails: bool,
    inspect_fails: bool,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            enabled: true,
            visible: true,
            hidden_below_width: None,
            parent: None,
            click_fails: false,
            fill_fails: false,
            inspect_fails: false,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Report the element as hidden while the viewport is narrower than `width`
    pub fn hidden_below(mut self, width: u32) -> Self {
        self.hidden_below_width = Some(width);
        self
    }

    /// Nest under the element at document index `parent`
    pub fn inside(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }

    pub fn failing_fill(mut self) -> Self {
        self.fill_fails = true;
        self
    }

    /// Enabled and visible state queries error out
    pub fn failing_inspection(mut self) -> Self {
        self.inspect_fails = true;
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .any(|part| SimpleSelector::parse(part.trim()).map_or(false, |s| s.matches(self)))
    }
}

/// The subset of CSS the fakes understand: `tag`, `*`, and a single optional
/// attribute clause such as `[href]`, `[type='submit']` or `[class*='main' i]`
struct SimpleSelector {
    tag: Option<String>,
    attr: Option<(String, Option<(bool, String)>, bool)>,
}

impl SimpleSelector {
    fn parse(raw: &str) -> Option<Self> {
        let (tag, rest) = match raw.find('[') {
            Some(i) => (&raw[..i], Some(&raw[i..])),
            None => (raw, None),
        };
        let tag = match tag.trim() {
            "" | "*" => None,
            t => Some(t.to_lowercase()),
        };

        let attr = match rest {
            None => None,
            Some(clause) => {
                let inner = clause.strip_prefix('[')?.strip_suffix(']')?.trim();
                let (inner, insensitive) = match inner.strip_suffix(" i") {
                    Some(stripped) => (stripped.trim(), true),
                    None => (inner, false),
                };
                match inner.find('=') {
                    None => Some((inner.to_string(), None, false)),
                    Some(eq) => {
                        let (name, contains) = match inner[..eq].strip_suffix('*') {
                            Some(n) => (n, true),
                            None => (&inner[..eq], false),
                        };
                        let value = inner[eq + 1..].trim().trim_matches(|c: char| c == '\'' || c == '"');
                        Some((
                            name.trim().to_string(),
                            Some((contains, value.to_string())),
                            insensitive,
                        ))
                    }
                }
            }
        };

        Some(Self { tag, attr })
    }

    fn matches(&self, element: &FakeElement) -> bool {
        if let Some(ref tag) = self.tag {
            if *tag != element.tag {
                return false;
            }
        }
        match &self.attr {
            None => true,
            Some((name, None, _)) => element.attribute(name).is_some(),
            Some((name, Some((contains, expected)), insensitive)) => {
                match element.attribute(name) {
                    None => false,
                    Some(actual) => {
                        let (actual, expected) = if *insensitive {
                            (actual.to_lowercase(), expected.to_lowercase())
                        } else {
                            (actual.to_string(), expected.clone())
                        };
                        if *contains {
                            actual.contains(&expected)
                        } else {
                            actual == expected
                        }
                    }
                }
            }
        }
    }
}

/// A static page served by `FakeSession`
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    title: String,
    content: String,
    elements: Vec<FakeElement>,
    navigation_fails: bool,
    title_panics: bool,
}

impl FakePage {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    /// A page with a title and more than 100 characters of markup
    pub fn rich(title: &str) -> Self {
        let body = "<p>Welcome to the application. This paragraph pads the document.</p>".repeat(3);
        Self::new(
            title,
            &format!("<html><head><title>{}</title></head><body>{}</body></html>", title, body),
        )
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.navigation_fails = true;
        self
    }

    pub fn panicking_title(mut self) -> Self {
        self.title_panics = true;
        self
    }
}

pub struct FakeSession {
    page: FakePage,
    width: Mutex<u32>,
    actions: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl FakeSession {
    fn element(&self, element: ElementRef) -> Result<&FakeElement> {
        self.page
            .elements
            .get(element.0)
            .ok_or_else(|| anyhow!("stale element reference {}", element.0))
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }

    fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut current = self.page.elements[index].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.page.elements.get(p).and_then(|e| e.parent);
        }
        false
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        if self.page.navigation_fails {
            anyhow::bail!("net::ERR_CONNECTION_REFUSED at {}", url);
        }
        self.record(format!("goto {}", url));
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        if self.page.title_panics {
            panic!("renderer crashed");
        }
        Ok(self.page.title.clone())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content.clone())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        Ok(self
            .page
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(selector))
            .map(|(i, _)| ElementRef(i))
            .collect())
    }

    async fn find_within(&self, parent: ElementRef, selector: &str) -> Result<Vec<ElementRef>> {
        self.element(parent)?;
        Ok(self
            .page
            .elements
            .iter()
            .enumerate()
            .filter(|(i, e)| self.is_descendant(*i, parent.0) && e.matches(selector))
            .map(|(i, _)| ElementRef(i))
            .collect())
    }

    async fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attribute(name).map(str::to_string))
    }

    async fn text(&self, element: ElementRef) -> Result<String> {
        Ok(self.element(element)?.text.clone())
    }

    async fn click(&self, element: ElementRef) -> Result<()> {
        if self.element(element)?.click_fails {
            anyhow::bail!("element {} is not clickable", element.0);
        }
        self.record(format!("click {}", element.0));
        Ok(())
    }

    async fn fill(&self, element: ElementRef, text: &str) -> Result<()> {
        if self.element(element)?.fill_fails {
            anyhow::bail!("element {} is read-only", element.0);
        }
        self.record(format!("fill {} {}", element.0, text));
        Ok(())
    }

    async fn is_enabled(&self, element: ElementRef) -> Result<bool> {
        let el = self.element(element)?;
        if el.inspect_fails {
            anyhow::bail!("element {} is detached from the DOM", element.0);
        }
        Ok(el.enabled)
    }

    async fn is_visible(&self, element: ElementRef) -> Result<bool> {
        let el = self.element(element)?;
        if el.inspect_fails {
            anyhow::bail!("element {} is detached from the DOM", element.0);
        }
        let width = *self.width.lock().unwrap();
        let hidden_at_width = el.hidden_below_width.map_or(false, |min| width < min);
        Ok(el.visible && !hidden_at_width)
    }

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        *self.width.lock().unwrap() = width;
        self.record(format!("viewport {}x{}", width, height));
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.record("back".to_string());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out a fresh `FakeSession` over the same page on every launch
pub struct FakeLauncher {
    page: FakePage,
    launch_fails: bool,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    actions: Arc<Mutex<Vec<String>>>,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            launch_fails: false,
            launches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            launch_fails: true,
            ..Self::new(FakePage::default())
        }
    }

    /// Browser settings with every wait set to zero
    pub fn fast_config() -> BrowserConfig {
        BrowserConfig {
            settle_delay: Duration::ZERO,
            step_delay: Duration::ZERO,
            ..BrowserConfig::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn BrowserSession>> {
        if self.launch_fails {
            anyhow::bail!("Failed to launch Chromium: executable not found");
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            page: self.page.clone(),
            width: Mutex::new(config.viewport_width),
            actions: self.actions.clone(),
            closes: self.closes.clone(),
        }))
    }
}

/// Scripted `HttpProbe`
pub struct FakeHttpProbe {
    outcome: std::result::Result<(u16, Duration, Vec<(String, String)>), String>,
    requests: AtomicUsize,
    last_timeout: Mutex<Option<Duration>>,
}

impl FakeHttpProbe {
    pub fn responding(status: u16, elapsed: Duration, headers: &[(&str, &str)]) -> Self {
        Self {
            outcome: Ok((
                status,
                elapsed,
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )),
            requests: AtomicUsize::new(0),
            last_timeout: Mutex::new(None),
        }
    }

    pub fn ok() -> Self {
        Self::responding(200, Duration::from_millis(120), &[])
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            requests: AtomicUsize::new(0),
            last_timeout: Mutex::new(None),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.lock().unwrap()
    }
}

#[async_trait]
impl HttpProbe for FakeHttpProbe {
    async fn get(&self, _url: &str, timeout: Duration) -> Result<ProbeResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_timeout.lock().unwrap() = Some(timeout);

        let (status, elapsed, pairs) = self.outcome.clone().map_err(|e| anyhow!(e))?;
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(&value)?,
            );
        }
        Ok(ProbeResponse {
            status,
            headers,
            elapsed,
        })
    }
}
