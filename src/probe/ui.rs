use anyhow::Result;

use super::{Outcome, ProbeContext};
use crate::driver::session::SessionGuard;
use crate::driver::traits::BrowserSession;
use crate::runner::classify::UiCheck;
use crate::utils::config::BrowserConfig;

/// Desktop, tablet and phone viewports, in the order they are applied
pub const RESPONSIVE_SIZES: [(u32, u32); 3] = [(1920, 1080), (768, 1024), (375, 667)];
pub const UI_ELEMENT_SELECTOR: &str = "h1, h2, h3, p, div, button, input";
/// A page needs more than this many UI elements to pass
pub const MIN_UI_ELEMENTS: usize = 5;

pub async fn run(ctx: ProbeContext<'_>, check: UiCheck, base_url: &str) -> Result<Outcome> {
    let guard = SessionGuard::open(ctx.launcher, ctx.browser, base_url).await?;
    let outcome = match check {
        UiCheck::Responsive => check_responsive(guard.session(), ctx.browser).await,
        UiCheck::Generic => check_elements(guard.session()).await,
    };
    guard.release().await;
    outcome
}

async fn check_responsive(session: &dyn BrowserSession, config: &BrowserConfig) -> Result<Outcome> {
    for (width, height) in RESPONSIVE_SIZES {
        session.set_viewport(width, height).await?;
        tokio::time::sleep(config.step_delay).await;

        let displayed = match session.find_all("body").await?.first() {
            Some(body) => session.is_visible(*body).await?,
            None => false,
        };
        if !displayed {
            log::debug!("Body not displayed at {}x{}", width, height);
            return Ok(Outcome::fail(
                "Responsive design test failed - page doesn't adapt properly",
            ));
        }
    }

    Ok(Outcome::pass(
        "Responsive design test passed - page adapts to different screen sizes",
    ))
}

async fn check_elements(session: &dyn BrowserSession) -> Result<Outcome> {
    let count = session.find_all(UI_ELEMENT_SELECTOR).await?.len();
    Ok(if count > MIN_UI_ELEMENTS {
        Outcome::pass(format!("UI test passed - page has {} UI elements", count))
    } else {
        Outcome::fail("UI test failed - insufficient UI elements found")
    })
}
