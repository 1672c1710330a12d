//! Base interaction contract shared by every page object.
//!
//! Page objects compose a [`BasePage`] rather than inheriting from it. The
//! error policy is asymmetric on purpose:
//!
//! | operation | on failure |
//! |---|---|
//! | [`BasePage::is_visible`] | `false`, never an error |
//! | [`BasePage::get_text`] | error from the wait; missing text is `""` |
//! | [`BasePage::click`] / [`BasePage::fill`] / [`BasePage::select_option`] | error propagates |
//! | [`BasePage::wait_for`] | [`ShopError::Timeout`] |

use crate::config::{join_url, SuiteConfig};
use crate::driver::SharedPage;
use crate::element::ElementRef;
use crate::locator::{Locator, Selector};
use crate::result::{ShopError, ShopResult};
use crate::screenshot::save_screenshot;
use crate::wait::{
    wait_for_url, wait_for_visible, LoadState, WaitOptions, DEFAULT_WAIT_TIMEOUT_MS,
    URL_EXPECT_TIMEOUT_MS, VISIBILITY_PROBE_TIMEOUT_MS,
};
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Identity of a page object
pub trait PageObject {
    /// The shared base contract
    fn base(&self) -> &BasePage;

    /// Regex matching this page's URL (e.g. `inventory\.html`)
    fn url_pattern(&self) -> &'static str;

    /// Page name for logging
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Page")
    }
}

/// Generic wait/act/read primitives over one shared page
#[derive(Debug, Clone)]
pub struct BasePage {
    page: SharedPage,
    base_url: String,
    screenshot_dir: PathBuf,
}

impl BasePage {
    /// Bind to a page using the suite configuration
    #[must_use]
    pub fn new(page: SharedPage, config: &SuiteConfig) -> Self {
        Self::with_settings(page, &config.base_url, config.screenshot_dir.clone())
    }

    /// Bind to a page with explicit settings
    #[must_use]
    pub fn with_settings(page: SharedPage, base_url: &str, screenshot_dir: PathBuf) -> Self {
        Self {
            page,
            base_url: base_url.trim_end_matches('/').to_string(),
            screenshot_dir,
        }
    }

    /// The shared page handle
    #[must_use]
    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    /// Base URL relative paths are joined onto
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for a selector on this page
    #[must_use]
    pub fn element(&self, selector: impl Into<Selector>) -> ElementRef {
        ElementRef::new(self.page.clone(), Locator::new(selector))
    }

    /// Navigate to `path` (absolute URLs pass through; empty means the base URL)
    pub async fn goto(&self, path: &str) -> ShopResult<()> {
        let url = join_url(&self.base_url, path);
        debug!(%url, "goto");
        self.page.goto(&url).await
    }

    /// Wait for network idle
    pub async fn wait_for_page_load(&self) -> ShopResult<()> {
        self.page
            .wait_for_load_state(
                LoadState::NetworkIdle,
                std::time::Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            )
            .await
    }

    /// Document title
    pub async fn title(&self) -> ShopResult<String> {
        self.page.title().await
    }

    /// Current URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.page.url().await
    }

    /// Wait until the URL matches `pattern` (5 second budget)
    pub async fn expect_url(&self, pattern: &str) -> ShopResult<String> {
        let regex = Regex::new(pattern).map_err(|e| ShopError::assertion(e.to_string()))?;
        wait_for_url(
            self.page.as_ref(),
            &regex,
            &WaitOptions::new().with_timeout(URL_EXPECT_TIMEOUT_MS),
        )
        .await
        .map_err(|e| match e {
            ShopError::Timeout { what, .. } => ShopError::assertion(format!("expected {what}")),
            other => other,
        })
    }

    /// Wait until the element is attached and visible
    pub async fn wait_for(&self, element: &ElementRef, timeout_ms: u64) -> ShopResult<()> {
        debug!(selector = %element, timeout_ms, "wait_for");
        wait_for_visible(
            self.page.as_ref(),
            element.locator(),
            &WaitOptions::new().with_timeout(timeout_ms),
        )
        .await
        .map(|_| ())
    }

    /// Visibility probe: waits up to 5 seconds, never fails
    pub async fn is_visible(&self, element: &ElementRef) -> bool {
        let probe = async {
            self.wait_for(element, VISIBILITY_PROBE_TIMEOUT_MS).await?;
            element.is_visible_now().await
        };
        match probe.await {
            Ok(visible) => visible,
            Err(e) if e.is_timeout() || e.is_missing_element() => {
                debug!(selector = %element, "not visible");
                false
            }
            Err(e) => {
                warn!(selector = %element, error = %e, "visibility probe failed; treating as not visible");
                false
            }
        }
    }

    /// Text content after waiting; missing text reads as `""`
    pub async fn get_text(&self, element: &ElementRef) -> ShopResult<String> {
        self.wait_for(element, DEFAULT_WAIT_TIMEOUT_MS).await?;
        Ok(self
            .page
            .text_content(element.locator())
            .await?
            .unwrap_or_default())
    }

    /// Click after waiting
    pub async fn click(&self, element: &ElementRef) -> ShopResult<()> {
        self.wait_for(element, DEFAULT_WAIT_TIMEOUT_MS).await?;
        debug!(selector = %element, "click");
        self.page.click(element.locator()).await
    }

    /// Fill after waiting
    pub async fn fill(&self, element: &ElementRef, value: &str) -> ShopResult<()> {
        self.wait_for(element, DEFAULT_WAIT_TIMEOUT_MS).await?;
        debug!(selector = %element, "fill");
        self.page.fill(element.locator(), value).await
    }

    /// Select an option after waiting
    pub async fn select_option(&self, element: &ElementRef, value: &str) -> ShopResult<()> {
        self.select_option_within(element, value, DEFAULT_WAIT_TIMEOUT_MS)
            .await
    }

    /// Select an option after waiting up to `timeout_ms`
    pub async fn select_option_within(
        &self,
        element: &ElementRef,
        value: &str,
        timeout_ms: u64,
    ) -> ShopResult<()> {
        self.wait_for(element, timeout_ms).await?;
        debug!(selector = %element, value, "select_option");
        self.page.select_option(element.locator(), value).await
    }

    /// Current value of an input (no waiting)
    pub async fn input_value(&self, element: &ElementRef) -> ShopResult<String> {
        self.page.input_value(element.locator()).await
    }

    /// Attribute after waiting
    pub async fn get_attribute(&self, element: &ElementRef, name: &str) -> ShopResult<Option<String>> {
        self.wait_for(element, DEFAULT_WAIT_TIMEOUT_MS).await?;
        self.page.get_attribute(element.locator(), name).await
    }

    /// Whether the element is enabled (no waiting)
    pub async fn is_enabled(&self, element: &ElementRef) -> ShopResult<bool> {
        self.page.is_enabled(element.locator()).await
    }

    /// Full-page screenshot to `<screenshot_dir>/<name>.png`
    pub async fn screenshot(&self, name: &str) -> ShopResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{name}.png"));
        save_screenshot(self.page.as_ref(), &path).await
    }
}
