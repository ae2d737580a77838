use anyhow::Result;
use async_trait::async_trait;

use crate::utils::config::BrowserConfig;

/// Handle to an element found during a session.
///
/// Only meaningful for the session that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub usize);

/// One browser page owned by a single test.
///
/// Selectors are CSS selectors. Every call blocks until the engine answers
/// or its own timeout fires.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url`, bounded by the configured page-load timeout
    async fn goto(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    /// Serialized DOM of the current page
    async fn content(&self) -> Result<String>;

    /// All elements matching `selector`, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>>;

    /// Descendants of `parent` matching `selector`, in document order
    async fn find_within(&self, parent: ElementRef, selector: &str) -> Result<Vec<ElementRef>>;

    async fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>>;

    /// Rendered text of an element
    async fn text(&self, element: ElementRef) -> Result<String>;

    async fn click(&self, element: ElementRef) -> Result<()>;

    /// Replace the value of an input with `text`
    async fn fill(&self, element: ElementRef, text: &str) -> Result<()>;

    async fn is_enabled(&self, element: ElementRef) -> Result<bool>;

    async fn is_visible(&self, element: ElementRef) -> Result<bool>;

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()>;

    /// Navigate one entry back in history
    async fn back(&self) -> Result<()>;

    /// Terminate the session and free the browser
    async fn close(&self) -> Result<()>;
}

/// Creates browser sessions from an immutable configuration
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn BrowserSession>>;
}
