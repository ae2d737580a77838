//! Browser session implementation using Playwright
//!
//! Every launch starts its own Playwright driver, Chromium instance, context
//! and page, so no state is shared between tests.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use playwright::api::{Browser, BrowserContext, ElementHandle, Page, Viewport};
use playwright::Playwright;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::driver::traits::{BrowserSession, ElementRef, SessionLauncher};
use crate::utils::config::BrowserConfig;

/// Launches headless Chromium sessions through Playwright
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaywrightLauncher;

#[async_trait]
impl SessionLauncher for PlaywrightLauncher {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(WebSession::launch(config).await?))
    }
}

/// One Chromium page driven through Playwright
pub struct WebSession {
    #[allow(dead_code)]
    playwright: Playwright,
    browser: Browser,
    context: BrowserContext,
    page: Page,
    /// Handles returned to callers, addressed by `ElementRef` index
    elements: Mutex<Vec<ElementHandle>>,
    page_load_timeout_ms: f64,
    action_timeout_ms: f64,
}

impl WebSession {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let chromium = playwright.chromium();
        let mut launcher = chromium.launcher();
        launcher = launcher.headless(config.headless);

        let executable = config.executable.clone().or_else(find_system_browser);
        if let Some(ref path) = executable {
            log::debug!("Using browser executable: {}", path.display());
            launcher = launcher.executable(path);
        } else {
            log::debug!("No browser executable found, using Playwright's bundled Chromium");
        }
        launcher = launcher.args(&config.args);

        let browser = launcher
            .launch()
            .await
            .context("Failed to launch Chromium")?;
        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        Ok(Self {
            playwright,
            browser,
            context,
            page,
            elements: Mutex::new(Vec::new()),
            page_load_timeout_ms: config.page_load_timeout.as_millis() as f64,
            action_timeout_ms: config.action_timeout.as_millis() as f64,
        })
    }

    async fn register(&self, handles: Vec<ElementHandle>) -> Vec<ElementRef> {
        let mut elements = self.elements.lock().await;
        handles
            .into_iter()
            .map(|handle| {
                elements.push(handle);
                ElementRef(elements.len() - 1)
            })
            .collect()
    }
}

fn stale(element: ElementRef) -> anyhow::Error {
    anyhow!("Unknown element reference {}", element.0)
}

#[async_trait]
impl BrowserSession for WebSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto_builder(url)
            .timeout(self.page_load_timeout_ms)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.title().await?)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        let handles = self.page.query_selector_all(selector).await?;
        Ok(self.register(handles).await)
    }

    async fn find_within(&self, parent: ElementRef, selector: &str) -> Result<Vec<ElementRef>> {
        let handles = {
            let elements = self.elements.lock().await;
            let parent_handle = elements.get(parent.0).ok_or_else(|| stale(parent))?;
            parent_handle.query_selector_all(selector).await?
        };
        Ok(self.register(handles).await)
    }

    async fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        Ok(handle.get_attribute(name).await?)
    }

    async fn text(&self, element: ElementRef) -> Result<String> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        Ok(handle.inner_text().await?)
    }

    async fn click(&self, element: ElementRef) -> Result<()> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        handle
            .click_builder()
            .timeout(self.action_timeout_ms)
            .click()
            .await?;
        Ok(())
    }

    async fn fill(&self, element: ElementRef, text: &str) -> Result<()> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        handle
            .fill_builder(text)
            .timeout(self.action_timeout_ms)
            .fill()
            .await?;
        Ok(())
    }

    async fn is_enabled(&self, element: ElementRef) -> Result<bool> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        Ok(handle.is_enabled().await?)
    }

    async fn is_visible(&self, element: ElementRef) -> Result<bool> {
        let elements = self.elements.lock().await;
        let handle = elements.get(element.0).ok_or_else(|| stale(element))?;
        Ok(handle.is_visible().await?)
    }

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        self.page
            .set_viewport_size(Viewport {
                width: width as i32,
                height: height as i32,
            })
            .await?;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        // Use JavaScript for back navigation
        self.page
            .evaluate::<(), ()>("window.history.back()", ())
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.elements.lock().await.clear();
        self.context
            .close()
            .await
            .context("Failed to close browser context")?;
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        Ok(())
    }
}

fn find_system_browser() -> Option<PathBuf> {
    let common_paths = [
        // Linux - Prioritize Google Chrome first
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    common_paths
        .iter()
        .map(std::path::Path::new)
        .find(|p| p.exists())
        .map(|p| p.to_path_buf())
}
