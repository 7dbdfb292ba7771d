//! Browser backends.
//!
//! The three supported browsers are interchangeable implementations of one
//! capability interface: each knows its WebDriver endpoint, how to build a
//! headless capability set with automation countermeasures, and whether a
//! CDP stealth script must be installed after connect.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use thirtyfour::Capabilities;

/// Realistic desktop user-agent presented to the form.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

/// Script installed on every new document for Chromium-based browsers.
/// Firefox covers the same signals through profile preferences.
const CHROMIUM_STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => false });
window.chrome = { runtime: {} };
if (navigator.permissions) {
    const originalQuery = navigator.permissions.query;
    navigator.permissions.query = (parameters) => (
        parameters.name === 'notifications' ?
            Promise.resolve({ state: Notification.permission }) :
            originalQuery(parameters)
    );
}
"#;

/// Browser selection, three-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Firefox,
    Chrome,
    Edge,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
            Browser::Edge => "edge",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The common interface all browser backends implement.
pub trait BrowserBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// WebDriver endpoint for this browser's driver process.
    fn webdriver_url(&self) -> &'static str;

    /// W3C capability set: headless, fixed window size, overridden
    /// user-agent, automation flags suppressed.
    fn capabilities(&self, user_agent: &str) -> Capabilities;

    /// Script to install via CDP after connect, if the browser needs one.
    fn stealth_script(&self) -> Option<&'static str> {
        None
    }
}

pub struct FirefoxBackend;

impl BrowserBackend for FirefoxBackend {
    fn name(&self) -> &'static str {
        "firefox"
    }

    fn webdriver_url(&self) -> &'static str {
        "http://localhost:4444"
    }

    fn capabilities(&self, user_agent: &str) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!("firefox"));
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({
                "args": ["-headless", "--width=1080", "--height=1024"],
                "prefs": {
                    "general.useragent.override": user_agent,
                    "dom.webdriver.enabled": false,
                    "useAutomationExtension": false,
                }
            }),
        );
        caps
    }
}

pub struct ChromeBackend;

impl BrowserBackend for ChromeBackend {
    fn name(&self) -> &'static str {
        "chrome"
    }

    fn webdriver_url(&self) -> &'static str {
        "http://localhost:9515"
    }

    fn capabilities(&self, user_agent: &str) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            chromium_options(user_agent),
        );
        caps
    }

    fn stealth_script(&self) -> Option<&'static str> {
        Some(CHROMIUM_STEALTH_SCRIPT)
    }
}

pub struct EdgeBackend;

impl BrowserBackend for EdgeBackend {
    fn name(&self) -> &'static str {
        "edge"
    }

    fn webdriver_url(&self) -> &'static str {
        "http://localhost:9515"
    }

    fn capabilities(&self, user_agent: &str) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!("MicrosoftEdge"));
        caps.insert("ms:edgeOptions".to_string(), chromium_options(user_agent));
        caps
    }

    // Edge is Chromium-based and responds to the same CDP commands.
    fn stealth_script(&self) -> Option<&'static str> {
        Some(CHROMIUM_STEALTH_SCRIPT)
    }
}

fn chromium_options(user_agent: &str) -> serde_json::Value {
    json!({
        "args": [
            "--headless=new",
            "--disable-gpu",
            "--window-size=1080,1024",
            format!("--user-agent={user_agent}"),
        ],
        "excludeSwitches": ["enable-automation"],
        "useAutomationExtension": false,
    })
}

/// Select the backend implementation for the requested browser.
pub fn create_backend(browser: Browser) -> Arc<dyn BrowserBackend> {
    match browser {
        Browser::Firefox => Arc::new(FirefoxBackend),
        Browser::Chrome => Arc::new(ChromeBackend),
        Browser::Edge => Arc::new(EdgeBackend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_selection_matches_browser() {
        assert_eq!(create_backend(Browser::Firefox).name(), "firefox");
        assert_eq!(create_backend(Browser::Chrome).name(), "chrome");
        assert_eq!(create_backend(Browser::Edge).name(), "edge");
    }

    #[test]
    fn firefox_caps_are_headless_with_ua_override() {
        let caps = FirefoxBackend.capabilities(USER_AGENT);
        let opts = &caps["moz:firefoxOptions"];
        let args = opts["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "-headless"));
        assert_eq!(opts["prefs"]["general.useragent.override"], USER_AGENT);
        assert_eq!(opts["prefs"]["dom.webdriver.enabled"], false);
        assert!(FirefoxBackend.stealth_script().is_none());
    }

    #[test]
    fn chromium_caps_suppress_automation_switches() {
        for (caps, key) in [
            (ChromeBackend.capabilities(USER_AGENT), "goog:chromeOptions"),
            (EdgeBackend.capabilities(USER_AGENT), "ms:edgeOptions"),
        ] {
            let opts = &caps[key];
            let args = opts["args"].as_array().unwrap();
            assert!(args.iter().any(|a| a == "--headless=new"));
            assert!(args
                .iter()
                .any(|a| a.as_str().unwrap().starts_with("--user-agent=")));
            assert_eq!(opts["excludeSwitches"][0], "enable-automation");
        }
        assert!(ChromeBackend.stealth_script().is_some());
        assert!(EdgeBackend.stealth_script().is_some());
    }

    #[test]
    fn chromium_backends_share_a_driver_port() {
        assert_eq!(FirefoxBackend.webdriver_url(), "http://localhost:4444");
        assert_eq!(ChromeBackend.webdriver_url(), "http://localhost:9515");
        assert_eq!(EdgeBackend.webdriver_url(), "http://localhost:9515");
    }
}
