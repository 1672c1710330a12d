//! Per-scenario setup and teardown.
//!
//! A [`ScenarioFixture`] opens a fresh page from its [`SessionFactory`],
//! builds a [`PageManager`] over it, runs the scenario body, captures a
//! failure screenshot when the body fails and always closes the page.

use crate::config::SuiteConfig;
use crate::driver::SharedPage;
use crate::mock::MockPage;
use crate::page_manager::PageManager;
use crate::result::ShopResult;
use crate::screenshot::capture_failure;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Source of fresh page handles, one per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync + std::fmt::Debug {
    /// Open an independent page
    async fn open(&self) -> ShopResult<SharedPage>;

    /// Driver name for logs and reports
    fn name(&self) -> &'static str;
}

/// Sessions backed by the in-memory storefront
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    base_url: String,
}

impl MockSessionFactory {
    /// Serve the storefront double at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self) -> ShopResult<SharedPage> {
        Ok(Arc::new(MockPage::storefront(&self.base_url)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Sessions backed by a dedicated Chromium process each
#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    settings: crate::browser::BrowserSettings,
}

#[cfg(feature = "browser")]
impl ChromiumSessionFactory {
    /// Launch browsers with `settings`
    #[must_use]
    pub const fn new(settings: crate::browser::BrowserSettings) -> Self {
        Self { settings }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> ShopResult<SharedPage> {
        let browser = crate::browser::ChromiumBrowser::launch(self.settings.clone()).await?;
        Ok(Arc::new(browser.into_page().await?))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Label of the step a scenario is executing
#[derive(Debug, Default)]
pub struct StepTracker {
    current: Mutex<Option<String>>,
}

impl StepTracker {
    /// Record the step about to run
    pub fn enter(&self, label: impl Into<String>) {
        let label = label.into();
        debug!(step = %label, "step");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(label);
    }

    /// The most recent step, if any
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Everything a scenario body can reach
#[derive(Debug)]
pub struct ScenarioContext {
    /// Page objects over this scenario's page
    pub pages: PageManager,
    /// Suite configuration
    pub config: SuiteConfig,
    steps: StepTracker,
}

impl ScenarioContext {
    /// Bind a context to `page`
    #[must_use]
    pub fn new(page: SharedPage, config: SuiteConfig) -> Self {
        Self {
            pages: PageManager::new(page, &config),
            config,
            steps: StepTracker::default(),
        }
    }

    /// Mark the start of a named step
    pub fn step(&self, label: impl Into<String>) {
        self.steps.enter(label);
    }

    /// Step tracker
    #[must_use]
    pub const fn steps(&self) -> &StepTracker {
        &self.steps
    }
}

/// A scenario body
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, ShopResult<()>>;

/// Result of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Whether the body succeeded
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Step that was running when the body failed
    pub failed_step: Option<String>,
    /// Failure screenshot, when one was captured
    pub screenshot: Option<PathBuf>,
    /// Wall time of the last attempt
    pub duration_ms: u64,
    /// Number of attempts made
    pub attempts: u32,
}

impl ScenarioOutcome {
    /// Create a passing outcome
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            failed_step: None,
            screenshot: None,
            duration_ms: 0,
            attempts: 1,
        }
    }

    /// Create a failing outcome
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            ..Self::pass(name)
        }
    }

    /// Set duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }
}

/// Runs scenario bodies with setup, failure capture and teardown
#[derive(Debug, Clone)]
pub struct ScenarioFixture {
    factory: Arc<dyn SessionFactory>,
    config: SuiteConfig,
}

impl ScenarioFixture {
    /// Fixture opening sessions from `factory`
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>, config: SuiteConfig) -> Self {
        Self { factory, config }
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Driver name of the session factory
    #[must_use]
    pub fn driver_name(&self) -> &'static str {
        self.factory.name()
    }

    /// Run `body` once in a fresh session
    pub async fn run(&self, name: &str, body: ScenarioFn) -> ScenarioOutcome {
        let start = Instant::now();
        info!(scenario = name, driver = self.factory.name(), "scenario started");

        let page = match self.factory.open().await {
            Ok(page) => page,
            Err(e) => {
                warn!(scenario = name, error = %e, "could not open a session");
                return ScenarioOutcome::fail(name, e.to_string()).with_duration(start.elapsed());
            }
        };

        let ctx = ScenarioContext::new(page.clone(), self.config.clone());
        let result = body(&ctx).await;

        let outcome = match result {
            Ok(()) => {
                info!(scenario = name, "scenario passed");
                ScenarioOutcome::pass(name)
            }
            Err(e) => {
                let step = ctx.steps().current();
                warn!(scenario = name, step = ?step, error = %e, "scenario failed");
                let screenshot = capture_failure(
                    page.as_ref(),
                    &self.config.screenshot_dir,
                    name,
                    step.as_deref().unwrap_or("setup"),
                )
                .await;
                ScenarioOutcome {
                    failed_step: step,
                    screenshot,
                    ..ScenarioOutcome::fail(name, e.to_string())
                }
            }
        };

        if let Err(e) = page.close().await {
            warn!(scenario = name, error = %e, "failed to close page");
        }
        outcome.with_duration(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ShopError;
    use crate::test_data::User;

    #[derive(Debug)]
    struct SharedMock(Arc<MockPage>);

    #[async_trait]
    impl SessionFactory for SharedMock {
        async fn open(&self) -> ShopResult<SharedPage> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "shared-mock"
        }
    }

    #[derive(Debug)]
    struct Unavailable;

    #[async_trait]
    impl SessionFactory for Unavailable {
        async fn open(&self) -> ShopResult<SharedPage> {
            Err(ShopError::BrowserLaunch {
                message: "no chromium".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    fn passing(ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            ctx.step("open login");
            ctx.pages.login.goto("/").await?;
            ctx.step("login");
            ctx.pages.login.login(&User::STANDARD).await
        })
    }

    fn failing(ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            ctx.step("open login");
            ctx.pages.login.goto("/").await?;
            ctx.step("I see the \"Products\" title");
            Err(ShopError::assertion("title missing"))
        })
    }

    fn config(dir: &std::path::Path) -> SuiteConfig {
        SuiteConfig::default()
            .with_base_url("https://shop.test")
            .with_screenshot_dir(dir)
    }

    #[tokio::test]
    async fn test_passing_scenario_closes_page() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockPage::storefront("https://shop.test"));
        let fixture = ScenarioFixture::new(Arc::new(SharedMock(mock.clone())), config(dir.path()));
        let outcome = fixture.run("Login works", passing).await;
        assert!(outcome.passed, "{outcome:?}");
        assert!(outcome.screenshot.is_none());
        assert!(mock.is_closed());
    }

    #[tokio::test]
    async fn test_failure_captures_named_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockPage::storefront("https://shop.test"));
        let fixture = ScenarioFixture::new(Arc::new(SharedMock(mock.clone())), config(dir.path()));
        let outcome = fixture.run("Inventory: title", failing).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.error.as_deref(), Some("Assertion failed: title missing"));
        assert_eq!(outcome.failed_step.as_deref(), Some("I see the \"Products\" title"));
        let shot = outcome.screenshot.unwrap();
        let file_name = shot.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("Inventory_ title_I see the _Products_ title_"));
        assert!(shot.is_file());
        assert!(mock.is_closed());
    }

    #[tokio::test]
    async fn test_screenshot_failure_does_not_mask_error() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockPage::storefront("https://shop.test"));
        mock.set_screenshot(None);
        let fixture = ScenarioFixture::new(Arc::new(SharedMock(mock.clone())), config(dir.path()));
        let outcome = fixture.run("Inventory: title", failing).await;
        assert_eq!(outcome.error.as_deref(), Some("Assertion failed: title missing"));
        assert!(outcome.screenshot.is_none());
    }

    #[tokio::test]
    async fn test_session_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = ScenarioFixture::new(Arc::new(Unavailable), config(dir.path()));
        let outcome = fixture.run("Login works", passing).await;
        assert!(!outcome.passed);
        assert!(outcome.error.unwrap().contains("no chromium"));
    }

    #[test]
    fn test_step_tracker_keeps_latest() {
        let tracker = StepTracker::default();
        assert!(tracker.current().is_none());
        tracker.enter("first");
        tracker.enter("second");
        assert_eq!(tracker.current().as_deref(), Some("second"));
    }
}
