//! Scoped ownership of a browser session
//!
//! A `SessionGuard` is created right after launch and owns the session for
//! the rest of the test. `release` closes it explicitly; if the guard is
//! dropped without being released (an early `?` return or a panic), the
//! session is closed on a background task instead.

use anyhow::Result;
use std::sync::Arc;

use super::traits::{BrowserSession, SessionLauncher};
use crate::utils::config::BrowserConfig;

pub struct SessionGuard {
    session: Arc<dyn BrowserSession>,
    released: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Arc::from(session),
            released: false,
        }
    }

    /// Launch a session and navigate it to `url`.
    ///
    /// The session is released before returning when navigation fails.
    pub async fn open(
        launcher: &dyn SessionLauncher,
        config: &BrowserConfig,
        url: &str,
    ) -> Result<Self> {
        let guard = Self::new(launcher.launch(config).await?);
        if let Err(e) = guard.session().goto(url).await {
            guard.release().await;
            return Err(e);
        }
        tokio::time::sleep(config.settle_delay).await;
        Ok(guard)
    }

    pub fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    /// Close the session. Close failures are logged, never raised.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.session.close().await {
            log::warn!("Failed to close browser session: {:#}", e);
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let session = self.session.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::debug!("Browser session dropped without release; closing in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        log::warn!("Failed to close abandoned browser session: {:#}", e);
                    }
                });
            }
            Err(_) => log::warn!("Browser session dropped outside a runtime; not closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{FakeLauncher, FakePage};

    #[tokio::test]
    async fn test_open_and_release_closes_once() {
        let launcher = FakeLauncher::new(FakePage::new("Home", "<html></html>"));
        let guard = SessionGuard::open(&launcher, &FakeLauncher::fast_config(), "http://app.test")
            .await
            .unwrap();
        assert_eq!(guard.session().title().await.unwrap(), "Home");
        guard.release().await;

        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_failed_navigation_still_releases() {
        let launcher = FakeLauncher::new(FakePage::new("Home", "").failing_navigation());
        let result =
            SessionGuard::open(&launcher, &FakeLauncher::fast_config(), "http://app.test").await;

        assert!(result.is_err());
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_release_closes_in_background() {
        let launcher = FakeLauncher::new(FakePage::new("Home", ""));
        {
            let _guard =
                SessionGuard::open(&launcher, &FakeLauncher::fast_config(), "http://app.test")
                    .await
                    .unwrap();
        }
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(launcher.closes(), 1);
    }
}
