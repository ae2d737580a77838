use anyhow::Result;

use super::{Outcome, ProbeContext};
use crate::driver::session::SessionGuard;
use crate::driver::traits::{BrowserSession, ElementRef};
use crate::runner::classify::FunctionalCheck;
use crate::utils::config::BrowserConfig;

/// Minimum rendered document length for a page to count as loaded
pub const MIN_CONTENT_CHARS: usize = 100;
/// Anchors clicked by the navigation check
pub const NAVIGATION_LINK_LIMIT: usize = 5;
/// Buttons inspected by the button check
pub const BUTTON_LIMIT: usize = 3;
pub const FORM_PLACEHOLDER: &str = "test_data";

const FILLABLE_INPUT_TYPES: &[&str] = &["text", "email", "password"];
const SKIPPED_LINK_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];
const BUTTON_SELECTORS: &[&str] = &["button", "input[type='button']", "input[type='submit']"];

pub async fn run(ctx: ProbeContext<'_>, check: FunctionalCheck, base_url: &str) -> Result<Outcome> {
    let guard = SessionGuard::open(ctx.launcher, ctx.browser, base_url).await?;
    let outcome = probe(guard.session(), check, ctx.browser).await;
    guard.release().await;
    outcome
}

async fn probe(
    session: &dyn BrowserSession,
    check: FunctionalCheck,
    config: &BrowserConfig,
) -> Result<Outcome> {
    match check {
        FunctionalCheck::PageLoad => {
            let (title, loaded) = page_has_content(session).await?;
            Ok(if loaded {
                Outcome::pass(format!("Page loaded successfully. Title: '{}'", title))
            } else {
                Outcome::fail("Page failed to load properly")
            })
        }
        FunctionalCheck::Navigation => check_navigation(session, config).await,
        FunctionalCheck::Form => check_form(session).await,
        FunctionalCheck::Button => check_buttons(session).await,
        FunctionalCheck::Generic => {
            let (_, loaded) = page_has_content(session).await?;
            Ok(if loaded {
                Outcome::pass("Generic functional test passed - page loads and has content")
            } else {
                Outcome::fail("Generic functional test failed - page appears empty")
            })
        }
    }
}

/// Title and whether the page has a non-empty title and enough markup
async fn page_has_content(session: &dyn BrowserSession) -> Result<(String, bool)> {
    let title = session.title().await?;
    let content = session.content().await?;
    let loaded = !title.trim().is_empty() && content.chars().count() > MIN_CONTENT_CHARS;
    Ok((title, loaded))
}

fn is_followable(href: &str) -> bool {
    let href = href.trim().to_lowercase();
    !href.is_empty() && !SKIPPED_LINK_SCHEMES.iter().any(|s| href.starts_with(s))
}

async fn check_navigation(session: &dyn BrowserSession, config: &BrowserConfig) -> Result<Outcome> {
    let mut anchors = session.find_all("a").await?;

    // Positions of the first followable anchors in document order
    let mut targets = Vec::new();
    for (position, anchor) in anchors.iter().enumerate() {
        if targets.len() == NAVIGATION_LINK_LIMIT {
            break;
        }
        match session.attribute(*anchor, "href").await {
            Ok(Some(href)) if is_followable(&href) => targets.push(position),
            Ok(_) => {}
            Err(e) => log::debug!("Skipping anchor {}: {:#}", position, e),
        }
    }

    let mut working = 0;
    for position in targets {
        let Some(link) = anchors.get(position).copied() else {
            log::debug!("Anchor {} no longer present after navigating back", position);
            continue;
        };
        if let Err(e) = session.click(link).await {
            log::debug!("Link {} is not clickable: {:#}", position, e);
            continue;
        }
        working += 1;
        tokio::time::sleep(config.step_delay).await;

        if let Err(e) = session.back().await {
            log::warn!("Failed to navigate back after link {}: {:#}", position, e);
        }
        tokio::time::sleep(config.step_delay).await;

        // Handles go stale once the page changes
        anchors = session.find_all("a").await.unwrap_or_default();
    }

    Ok(if working > 0 {
        Outcome::pass(format!(
            "Navigation test passed. {} links tested successfully",
            working
        ))
    } else {
        Outcome::fail("No working navigation links found")
    })
}

async fn check_form(session: &dyn BrowserSession) -> Result<Outcome> {
    let forms = session.find_all("form").await?;
    let Some(form) = forms.first().copied() else {
        return Ok(Outcome::fail("No forms found on the page"));
    };

    let mut filled = 0;
    for input in session.find_within(form, "input").await? {
        if !is_fillable(session, input).await {
            continue;
        }
        match session.fill(input, FORM_PLACEHOLDER).await {
            Ok(()) => filled += 1,
            Err(e) => log::debug!("Could not fill input: {:#}", e),
        }
    }

    Ok(if filled > 0 {
        Outcome::pass(format!("Form test passed. Filled {} form fields", filled))
    } else {
        Outcome::fail("Form found but couldn't fill any fields")
    })
}

/// Text-like inputs only. An input without a `type` is a text input.
async fn is_fillable(session: &dyn BrowserSession, input: ElementRef) -> bool {
    match session.attribute(input, "type").await {
        Ok(kind) => {
            let kind = kind.unwrap_or_else(|| "text".to_string()).to_lowercase();
            FILLABLE_INPUT_TYPES.contains(&kind.trim())
        }
        Err(_) => false,
    }
}

async fn check_buttons(session: &dyn BrowserSession) -> Result<Outcome> {
    let mut buttons = Vec::new();
    for selector in BUTTON_SELECTORS {
        buttons.extend(session.find_all(selector).await?);
    }

    let mut clickable = 0;
    for button in buttons.into_iter().take(BUTTON_LIMIT) {
        let enabled = session.is_enabled(button).await;
        let visible = session.is_visible(button).await;
        match (enabled, visible) {
            (Ok(true), Ok(true)) => clickable += 1,
            (Ok(_), Ok(_)) => {}
            (Err(e), _) | (_, Err(e)) => log::debug!("Could not inspect button: {:#}", e),
        }
    }

    Ok(if clickable > 0 {
        Outcome::pass(format!(
            "Button test passed. Found {} clickable buttons",
            clickable
        ))
    } else {
        Outcome::fail("No clickable buttons found")
    })
}
