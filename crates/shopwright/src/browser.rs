//! Real browser pages over the Chrome DevTools Protocol.
//!
//! With the `browser` feature, [`ChromiumBrowser`] launches Chromium through
//! chromiumoxide and hands out [`ChromiumPage`]s implementing
//! [`PageDriver`](crate::driver::PageDriver). Locators are compiled to
//! JavaScript resolver expressions and evaluated in the page; clicks are
//! dispatched as trusted mouse events at the element's centre.
//!
//! Every engine named in [`BrowserKind`](crate::config::BrowserKind) runs on
//! Chromium; mobile kinds only change the emulated device.

use crate::config::SuiteConfig;
use crate::driver::DeviceDescriptor;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Launch settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Emulated device
    pub device: DeviceDescriptor,
    /// Budget for one driver call
    pub action_timeout_ms: u64,
    /// Budget for one navigation
    pub navigation_timeout_ms: u64,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            device: DeviceDescriptor::DESKTOP_CHROME,
            action_timeout_ms: crate::config::DEFAULT_DRIVER_TIMEOUT_MS,
            navigation_timeout_ms: crate::config::DEFAULT_DRIVER_TIMEOUT_MS,
            sandbox: true,
        }
    }
}

impl BrowserSettings {
    /// Settings derived from the suite configuration
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            chromium_path: config.chromium_path.clone(),
            device: config.device(),
            action_timeout_ms: config.action_timeout_ms,
            navigation_timeout_ms: config.navigation_timeout_ms,
            sandbox: true,
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Result of a single-element probe evaluated in the page
#[derive(Debug, Clone, serde::Deserialize)]
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
struct Probe<T> {
    found: bool,
    value: Option<T>,
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
impl<T: DeserializeOwned> Probe<T> {
    /// Decode the raw script result
    fn decode(raw: serde_json::Value) -> ShopResult<Self> {
        Ok(serde_json::from_value(raw)?)
    }

    /// Value of the first match; `NotFound` when nothing matched
    fn into_optional(self, locator: &Locator) -> ShopResult<Option<T>> {
        if self.found {
            Ok(self.value)
        } else {
            Err(ShopError::not_found(locator.to_string()))
        }
    }

    /// Like [`Self::into_optional`], but a missing value is a driver error
    fn into_required(self, locator: &Locator) -> ShopResult<T> {
        self.into_optional(locator)?
            .ok_or_else(|| ShopError::driver(format!("{locator}: script returned no value")))
    }
}

/// Wrap `body` (JS statements using `el`) so it runs against the first match
/// of `first_js` and reports whether there was one
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn probe_script(first_js: &str, body: &str) -> String {
    format!(
        "(() => {{ const el = {first_js}; if (!el) return {{ found: false }}; \
         return {{ found: true, value: (() => {{ {body} }})() }}; }})()"
    )
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const VISIBLE_BODY: &str = "const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
     return s.visibility !== 'hidden' && s.display !== 'none' && r.width > 0 && r.height > 0;";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const CENTRE_BODY: &str = "el.scrollIntoView({ block: 'center', inline: 'center' }); \
     const r = el.getBoundingClientRect(); \
     return { x: r.x + r.width / 2, y: r.y + r.height / 2, disabled: !!el.disabled };";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const FILL_BODY: &str = "if (!(el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement)) return 'not-input'; \
     if (el.disabled) return 'disabled'; \
     el.focus(); \
     const proto = Object.getPrototypeOf(el); \
     Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, __VALUE__); \
     el.dispatchEvent(new Event('input', { bubbles: true })); \
     el.dispatchEvent(new Event('change', { bubbles: true })); \
     return 'ok';";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const SELECT_BODY: &str = "if (!(el instanceof HTMLSelectElement)) return 'not-select'; \
     if (el.disabled) return 'disabled'; \
     if (!Array.from(el.options).some(o => o.value === __VALUE__)) return 'no-option'; \
     el.value = __VALUE__; \
     el.dispatchEvent(new Event('input', { bubbles: true })); \
     el.dispatchEvent(new Event('change', { bubbles: true })); \
     return 'ok';";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn with_value(body: &str, value: &str) -> String {
    let literal = serde_json::Value::String(value.to_string()).to_string();
    body.replace("__VALUE__", &literal)
}

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp {
    use super::{
        probe_script, with_value, BrowserSettings, Probe, CENTRE_BODY, FILL_BODY, SELECT_BODY,
        VISIBLE_BODY,
    };
    use crate::driver::PageDriver;
    use crate::locator::Locator;
    use crate::result::{ShopError, ShopResult};
    use crate::wait::{LoadState, DEFAULT_POLL_INTERVAL_MS, NETWORK_IDLE_THRESHOLD_MS};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::{
        SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
    };
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::future::Future;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::time::Instant;
    use tracing::{debug, warn};

    fn driver_err(e: impl std::fmt::Display) -> ShopError {
        ShopError::driver(e.to_string())
    }

    /// A launched Chromium process
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        settings: BrowserSettings,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch Chromium
        pub async fn launch(settings: BrowserSettings) -> ShopResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(settings.device.viewport_width, settings.device.viewport_height)
                .request_timeout(Duration::from_millis(settings.action_timeout_ms));

            if !settings.headless {
                builder = builder.with_head();
            }

            if !settings.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = settings.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ShopError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ShopError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            debug!(device = settings.device.name, headless = settings.headless, "chromium launched");
            Ok(Self {
                settings,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Launch settings
        #[must_use]
        pub const fn settings(&self) -> &BrowserSettings {
            &self.settings
        }

        /// Open a page with device emulation applied
        pub async fn new_page(&self) -> ShopResult<ChromiumPage> {
            let cdp_page = {
                let browser = self.inner.lock().await;
                browser.new_page("about:blank").await.map_err(driver_err)?
            };
            let device = &self.settings.device;

            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(device.viewport_width))
                .height(i64::from(device.viewport_height))
                .device_scale_factor(device.device_scale_factor)
                .mobile(device.is_mobile)
                .build()
                .map_err(ShopError::driver)?;
            cdp_page.execute(metrics).await.map_err(driver_err)?;
            cdp_page
                .execute(SetUserAgentOverrideParams::new(device.user_agent))
                .await
                .map_err(driver_err)?;
            if device.has_touch {
                cdp_page
                    .execute(SetTouchEmulationEnabledParams::new(true))
                    .await
                    .map_err(driver_err)?;
            }

            Ok(ChromiumPage {
                inner: Arc::new(Mutex::new(cdp_page)),
                owner: Mutex::new(None),
                action_timeout: Duration::from_millis(self.settings.action_timeout_ms),
                navigation_timeout: Duration::from_millis(self.settings.navigation_timeout_ms),
            })
        }

        /// Open a page that shuts this browser down when it is closed
        pub async fn into_page(self) -> ShopResult<ChromiumPage> {
            let page = self.new_page().await?;
            *page.owner.lock().await = Some(self);
            Ok(page)
        }

        /// Close the browser
        pub async fn close(self) -> ShopResult<()> {
            {
                let mut browser = self.inner.lock().await;
                browser.close().await.map_err(|e| ShopError::BrowserLaunch {
                    message: e.to_string(),
                })?;
                if let Err(e) = browser.wait().await {
                    debug!(error = %e, "chromium exit status unavailable");
                }
            }
            self.handle.abort();
            Ok(())
        }
    }

    /// One Chromium tab
    #[derive(Debug)]
    pub struct ChromiumPage {
        inner: Arc<Mutex<CdpPage>>,
        owner: Mutex<Option<ChromiumBrowser>>,
        action_timeout: Duration,
        navigation_timeout: Duration,
    }

    #[derive(Debug, Deserialize)]
    struct Centre {
        x: f64,
        y: f64,
        disabled: bool,
    }

    impl ChromiumPage {
        async fn bounded<T, F>(&self, budget: Duration, what: &str, fut: F) -> ShopResult<T>
        where
            F: Future<Output = ShopResult<T>>,
        {
            tokio::time::timeout(budget, fut)
                .await
                .map_err(|_| ShopError::Timeout {
                    ms: budget.as_millis() as u64,
                    what: what.to_string(),
                })?
        }

        async fn eval<T: DeserializeOwned>(&self, expression: String) -> ShopResult<T> {
            self.bounded(self.action_timeout, "script evaluation", async {
                let page = self.inner.lock().await;
                page.evaluate_expression(expression)
                    .await
                    .map_err(driver_err)?
                    .into_value()
                    .map_err(driver_err)
            })
            .await
        }

        /// Run `body` against the first match; `NotFound` when nothing matches
        async fn run_probe<T: DeserializeOwned>(
            &self,
            locator: &Locator,
            body: &str,
        ) -> ShopResult<Probe<T>> {
            let raw: serde_json::Value = self
                .eval(probe_script(&locator.to_js_first(), body))
                .await?;
            Probe::decode(raw)
        }

        async fn probe<T: DeserializeOwned>(&self, locator: &Locator, body: &str) -> ShopResult<T> {
            self.run_probe(locator, body).await?.into_required(locator)
        }

        async fn probe_optional<T: DeserializeOwned>(
            &self,
            locator: &Locator,
            body: &str,
        ) -> ShopResult<Option<T>> {
            self.run_probe(locator, body).await?.into_optional(locator)
        }

        async fn mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> ShopResult<()> {
            let params = DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(x)
                .y(y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(ShopError::driver)?;
            let page = self.inner.lock().await;
            page.execute(params).await.map_err(driver_err)?;
            Ok(())
        }

        fn check_status(locator: &Locator, status: &str, action: &str) -> ShopResult<()> {
            match status {
                "ok" => Ok(()),
                "disabled" => Err(ShopError::driver(format!("element {locator} is disabled"))),
                other => Err(ShopError::driver(format!("{action} on {locator} failed: {other}"))),
            }
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str) -> ShopResult<()> {
            debug!(url, "navigate");
            self.bounded(self.navigation_timeout, url, async {
                let page = self.inner.lock().await;
                page.goto(url).await.map_err(|e| ShopError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
                Ok(())
            })
            .await
        }

        async fn url(&self) -> ShopResult<String> {
            let page = self.inner.lock().await;
            Ok(page.url().await.map_err(driver_err)?.unwrap_or_default())
        }

        async fn title(&self) -> ShopResult<String> {
            let page = self.inner.lock().await;
            Ok(page.get_title().await.map_err(driver_err)?.unwrap_or_default())
        }

        async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> ShopResult<()> {
            let deadline = Instant::now() + timeout;
            let poll = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
            let idle = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
            let mut last_count: Option<u64> = None;
            let mut quiet_since = Instant::now();
            loop {
                let ready: String = self.eval("document.readyState".to_string()).await?;
                let done = match state {
                    LoadState::DomContentLoaded => ready != "loading",
                    LoadState::Load => ready == "complete",
                    LoadState::NetworkIdle => {
                        let count: u64 = self
                            .eval("performance.getEntriesByType('resource').length".to_string())
                            .await?;
                        if last_count != Some(count) {
                            last_count = Some(count);
                            quiet_since = Instant::now();
                        }
                        ready == "complete" && quiet_since.elapsed() >= idle
                    }
                };
                if done {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(ShopError::Timeout {
                        ms: timeout.as_millis() as u64,
                        what: format!("load state {state}"),
                    });
                }
                tokio::time::sleep(poll).await;
            }
        }

        async fn count(&self, locator: &Locator) -> ShopResult<usize> {
            self.eval(format!("{}.length", locator.to_js_all())).await
        }

        async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
            let probe: Probe<bool> = self.run_probe(locator, VISIBLE_BODY).await?;
            Ok(probe.found && probe.value.unwrap_or(false))
        }

        async fn is_enabled(&self, locator: &Locator) -> ShopResult<bool> {
            self.probe(locator, "return !el.disabled;").await
        }

        async fn click(&self, locator: &Locator) -> ShopResult<()> {
            let centre: Centre = self.probe(locator, CENTRE_BODY).await?;
            if centre.disabled {
                return Err(ShopError::driver(format!("element {locator} is disabled")));
            }
            self.mouse(DispatchMouseEventType::MousePressed, centre.x, centre.y)
                .await?;
            self.mouse(DispatchMouseEventType::MouseReleased, centre.x, centre.y)
                .await
        }

        async fn fill(&self, locator: &Locator, value: &str) -> ShopResult<()> {
            let status: String = self.probe(locator, &with_value(FILL_BODY, value)).await?;
            Self::check_status(locator, &status, "fill")
        }

        async fn select_option(&self, locator: &Locator, value: &str) -> ShopResult<()> {
            let status: String = self.probe(locator, &with_value(SELECT_BODY, value)).await?;
            Self::check_status(locator, &status, "select_option")
        }

        async fn text_content(&self, locator: &Locator) -> ShopResult<Option<String>> {
            self.probe_optional(locator, "return el.textContent;").await
        }

        async fn input_value(&self, locator: &Locator) -> ShopResult<String> {
            let value: Option<String> = self
                .probe_optional(locator, "return 'value' in el ? String(el.value) : null;")
                .await?;
            value.ok_or_else(|| {
                ShopError::driver(format!(
                    "element {locator} is not an <input>, <textarea> or <select>"
                ))
            })
        }

        async fn get_attribute(&self, locator: &Locator, name: &str) -> ShopResult<Option<String>> {
            let body = format!(
                "return el.getAttribute({});",
                serde_json::Value::String(name.to_string())
            );
            self.probe_optional(locator, &body).await
        }

        async fn evaluate(&self, locator: &Locator, function: &str) -> ShopResult<serde_json::Value> {
            let body = format!("return ({function})(el);");
            let value: Option<serde_json::Value> = self.probe_optional(locator, &body).await?;
            Ok(value.unwrap_or(serde_json::Value::Null))
        }

        async fn screenshot(&self, full_page: bool) -> ShopResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .capture_beyond_viewport(full_page)
                .build();

            let screenshot = {
                let page = self.inner.lock().await;
                page.execute(params)
                    .await
                    .map_err(|e| ShopError::Screenshot {
                        message: e.to_string(),
                    })?
            };

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ShopError::Screenshot {
                    message: e.to_string(),
                })
        }

        async fn close(&self) -> ShopResult<()> {
            let page = self.inner.lock().await.clone();
            let closed = page.close().await.map_err(driver_err);
            if let Some(browser) = self.owner.lock().await.take() {
                if let Err(e) = browser.close().await {
                    warn!(error = %e, "failed to shut down chromium");
                }
            }
            closed
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumPage};
