//! A single scoped browser session.
//!
//! All waits are blocking polls against a fixed timeout. Wait exhaustion
//! surfaces as [`CheckError::Timeout`] so callers can distinguish "element
//! never appeared" from transport failures. The session must be released
//! with [`Session::quit`] on every exit path.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use thirtyfour::error::WebDriverError;
use thirtyfour::extensions::cdp::ChromeDevTools;
use thirtyfour::prelude::*;
use tracing::{debug, info, warn};

use crate::backend::{BrowserBackend, USER_AGENT};
use crate::errors::CheckError;

/// Upper bound for every element wait.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(20);
/// Poll interval between wait attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct Session {
    driver: WebDriver,
    backend_name: &'static str,
}

impl Session {
    /// Connect to the backend's WebDriver endpoint with its capability set
    /// and install the stealth script when the backend requires one.
    pub async fn launch(backend: &dyn BrowserBackend) -> Result<Self, CheckError> {
        info!(backend = backend.name(), "initializing WebDriver session");
        let driver =
            WebDriver::new(backend.webdriver_url(), backend.capabilities(USER_AGENT)).await?;

        if let Some(script) = backend.stealth_script() {
            debug!("installing stealth script on new documents");
            let dev_tools = ChromeDevTools::new(driver.handle.clone());
            let installed = dev_tools
                .execute_cdp_with_params(
                    "Page.addScriptToEvaluateOnNewDocument",
                    serde_json::json!({ "source": script }),
                )
                .await;
            if let Err(e) = installed {
                // The remote session is already live; dropping the client
                // does not end it.
                let _ = driver.quit().await;
                return Err(e.into());
            }
        }

        Ok(Self {
            driver,
            backend_name: backend.name(),
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub async fn goto(&self, url: &str) -> Result<(), CheckError> {
        debug!(url, "navigating");
        self.driver.goto(url).await?;
        Ok(())
    }

    /// Wait for an element to be present.
    pub async fn wait_for(&self, css: &str) -> Result<WebElement, CheckError> {
        debug!(selector = css, "waiting for element");
        self.driver
            .query(By::Css(css))
            .wait(WAIT_TIMEOUT, POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| wait_error(css, e))
    }

    /// Wait for an element to be present and clickable.
    pub async fn wait_for_clickable(&self, css: &str) -> Result<WebElement, CheckError> {
        debug!(selector = css, "waiting for clickable element");
        self.driver
            .query(By::Css(css))
            .wait(WAIT_TIMEOUT, POLL_INTERVAL)
            .and_clickable()
            .first()
            .await
            .map_err(|e| wait_error(css, e))
    }

    /// Wait for an element to be present and displayed.
    pub async fn wait_for_visible(&self, css: &str) -> Result<WebElement, CheckError> {
        debug!(selector = css, "waiting for visible element");
        self.driver
            .query(By::Css(css))
            .wait(WAIT_TIMEOUT, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await
            .map_err(|e| wait_error(css, e))
    }

    /// Write a screenshot and the full page markup to the working
    /// directory under fixed names, for postmortem inspection.
    pub async fn dump_artifacts(&self, prefix: &str) -> Result<(PathBuf, PathBuf), CheckError> {
        let png = PathBuf::from(format!("{prefix}_{}.png", self.backend_name));
        let html = PathBuf::from(format!("{prefix}_{}.html", self.backend_name));

        self.driver.screenshot(&png).await?;
        let source = self.driver.source().await?;
        fs::write(&html, source)?;

        warn!(
            screenshot = %png.display(),
            markup = %html.display(),
            "debug artifacts written"
        );
        Ok((png, html))
    }

    /// Release the browser. Must run on every exit path.
    pub async fn quit(self) -> Result<(), CheckError> {
        info!("closing browser");
        self.driver.quit().await?;
        Ok(())
    }
}

/// Convert an exhausted wait into a timeout error carrying the selector;
/// anything else is a genuine WebDriver failure.
fn wait_error(selector: &str, err: WebDriverError) -> CheckError {
    match err {
        WebDriverError::NoSuchElement(_) | WebDriverError::Timeout(_) => CheckError::Timeout(
            format!("element '{selector}' after {}s", WAIT_TIMEOUT.as_secs()),
        ),
        other => CheckError::WebDriver(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_waits_become_timeouts() {
        let err = wait_error(
            "input#ssnInputControl",
            WebDriverError::Timeout("poll exhausted".to_string()),
        );
        match err {
            CheckError::Timeout(msg) => assert!(msg.contains("input#ssnInputControl")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn transport_failures_pass_through() {
        let err = wait_error(
            "#anchor-ui-0",
            WebDriverError::FatalError("session closed".to_string()),
        );
        assert!(matches!(err, CheckError::WebDriver(_)));
    }
}
