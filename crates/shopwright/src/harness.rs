//! Suite harness: runs scenarios on a bounded worker pool and aggregates
//! their outcomes into a report.

use crate::fixture::{ScenarioFixture, ScenarioOutcome};
use crate::result::ShopResult;
use crate::scenarios::Scenario;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{info, warn};

/// Results from running a suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Session driver the suite ran on
    pub driver: String,
    /// Outcomes, in catalog order
    pub results: Vec<ScenarioOutcome>,
    /// Total wall time
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Attempts beyond the first, summed over all scenarios
    #[must_use]
    pub fn retries_used(&self) -> u32 {
        self.results.iter().map(|r| r.attempts.saturating_sub(1)).sum()
    }

    /// Failure screenshots that were written
    #[must_use]
    pub fn screenshots(&self) -> Vec<&PathBuf> {
        self.results.iter().filter_map(|r| r.screenshot.as_ref()).collect()
    }

    /// Human-readable summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.suite_name, self.driver);
        for r in &self.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = write!(out, "  {status} {} [{} ms]", r.name, r.duration_ms);
            if r.attempts > 1 {
                let _ = write!(out, " after {} attempts", r.attempts);
            }
            out.push('\n');
            if let Some(error) = &r.error {
                let _ = writeln!(out, "       error: {error}");
            }
            if let Some(step) = &r.failed_step {
                let _ = writeln!(out, "       step: {step}");
            }
            if let Some(shot) = &r.screenshot {
                let _ = writeln!(out, "       screenshot: {}", shot.display());
            }
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} total, {} retries in {} ms",
            self.passed_count(),
            self.failed_count(),
            self.total(),
            self.retries_used(),
            self.duration_ms
        );
        out
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ShopResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs scenarios through a fixture
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    fixture: Arc<ScenarioFixture>,
    workers: usize,
    retries: u32,
}

impl SuiteRunner {
    /// Runner taking worker and retry counts from the fixture's config
    #[must_use]
    pub fn new(fixture: ScenarioFixture) -> Self {
        let workers = fixture.config().workers;
        let retries = fixture.config().retries;
        Self {
            fixture: Arc::new(fixture),
            workers,
            retries,
        }
    }

    /// Set the number of concurrent scenarios (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set extra attempts for failing scenarios
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Concurrency bound
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Run every scenario, each in its own session
    pub async fn run(&self, suite_name: &str, scenarios: &[Scenario]) -> SuiteReport {
        let start = Instant::now();
        info!(
            suite = suite_name,
            scenarios = scenarios.len(),
            workers = self.workers,
            retries = self.retries,
            "suite started"
        );

        let permits = Arc::new(Semaphore::new(self.workers.max(1)));
        let handles: Vec<_> = scenarios
            .iter()
            .copied()
            .map(|scenario| {
                let fixture = Arc::clone(&self.fixture);
                let permits = Arc::clone(&permits);
                let retries = self.retries;
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    run_with_retries(&fixture, scenario, retries).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (handle, scenario) in futures::future::join_all(handles).await.into_iter().zip(scenarios) {
            results.push(handle.unwrap_or_else(|e| {
                warn!(scenario = scenario.name, error = %e, "scenario task aborted");
                ScenarioOutcome::fail(scenario.name, format!("scenario task aborted: {e}"))
            }));
        }

        let report = SuiteReport {
            suite_name: suite_name.to_string(),
            driver: self.fixture.driver_name().to_string(),
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            suite = suite_name,
            passed = report.passed_count(),
            failed = report.failed_count(),
            "suite finished"
        );
        report
    }
}

async fn run_with_retries(fixture: &ScenarioFixture, scenario: Scenario, retries: u32) -> ScenarioOutcome {
    let mut attempt = 1;
    loop {
        let mut outcome = fixture.run(scenario.name, scenario.run).await;
        outcome.attempts = attempt;
        if outcome.passed || attempt > retries {
            return outcome;
        }
        warn!(scenario = scenario.name, attempt, "retrying failed scenario");
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::fixture::{MockSessionFactory, ScenarioContext};
    use crate::result::{ShopError, ShopResult};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FLAKY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn ok(ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move { ctx.pages.login.goto("/").await })
    }

    fn broken(ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            ctx.step("check");
            Err(ShopError::assertion("nope"))
        })
    }

    fn flaky(_ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            if FLAKY_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ShopError::assertion("first attempt"))
            } else {
                Ok(())
            }
        })
    }

    fn runner(dir: &std::path::Path) -> SuiteRunner {
        let config = SuiteConfig::default()
            .with_base_url("https://shop.test")
            .with_screenshot_dir(dir);
        let factory = Arc::new(MockSessionFactory::new("https://shop.test"));
        SuiteRunner::new(ScenarioFixture::new(factory, config))
    }

    fn outcome(name: &str, passed: bool, attempts: u32) -> ScenarioOutcome {
        let base = if passed {
            ScenarioOutcome::pass(name)
        } else {
            ScenarioOutcome::fail(name, "boom")
        };
        ScenarioOutcome { attempts, ..base }
    }

    mod report_tests {
        use super::*;

        fn report() -> SuiteReport {
            SuiteReport {
                suite_name: "storefront".to_string(),
                driver: "mock".to_string(),
                results: vec![
                    outcome("a", true, 1),
                    outcome("b", false, 3),
                    outcome("c", true, 2),
                ],
                duration_ms: 42,
            }
        }

        #[test]
        fn test_counts() {
            let report = report();
            assert!(!report.all_passed());
            assert_eq!(report.passed_count(), 2);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.total(), 3);
            assert_eq!(report.retries_used(), 3);
            assert_eq!(report.failures()[0].name, "b");
        }

        #[test]
        fn test_render_text() {
            let text = report().render_text();
            assert!(text.starts_with("storefront (mock)\n"));
            assert!(text.contains("  FAIL b [0 ms] after 3 attempts\n       error: boom"));
            assert!(text.ends_with("2 passed, 1 failed, 3 total, 3 retries in 42 ms\n"));
        }

        #[test]
        fn test_json_shape() {
            let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
            assert_eq!(json["suite_name"], "storefront");
            assert_eq!(json["results"][1]["passed"], false);
            assert_eq!(json["results"][1]["attempts"], 3);
        }

        #[test]
        fn test_empty_report_passes() {
            let report = SuiteReport {
                suite_name: "empty".to_string(),
                driver: "mock".to_string(),
                results: Vec::new(),
                duration_ms: 0,
            };
            assert!(report.all_passed());
            assert!(report.screenshots().is_empty());
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_results_keep_catalog_order() {
            let dir = tempfile::tempdir().unwrap();
            let scenarios = [
                Scenario { name: "one", tags: &[], run: ok },
                Scenario { name: "two", tags: &[], run: broken },
                Scenario { name: "three", tags: &[], run: ok },
            ];
            let report = runner(dir.path()).with_workers(2).run("suite", &scenarios).await;
            let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, ["one", "two", "three"]);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.driver, "mock");
            assert_eq!(report.screenshots().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_retries_until_pass() {
            let dir = tempfile::tempdir().unwrap();
            let scenarios = [Scenario { name: "flaky", tags: &[], run: flaky }];
            let report = runner(dir.path()).with_retries(2).run("suite", &scenarios).await;
            assert!(report.all_passed());
            assert_eq!(report.results[0].attempts, 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_retries_are_bounded() {
            let dir = tempfile::tempdir().unwrap();
            let scenarios = [Scenario { name: "broken", tags: &[], run: broken }];
            let report = runner(dir.path()).with_retries(1).run("suite", &scenarios).await;
            assert!(!report.all_passed());
            assert_eq!(report.results[0].attempts, 2);
            assert_eq!(report.results[0].failed_step.as_deref(), Some("check"));
        }

        #[test]
        fn test_workers_at_least_one() {
            let dir = tempfile::tempdir().unwrap();
            assert_eq!(runner(dir.path()).with_workers(0).workers(), 1);
        }
    }
}
