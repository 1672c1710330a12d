//! Full scenario catalog against the storefront double
//!
//! Every scenario runs in its own session on virtual time, so the
//! performance-glitch delay and the 15 second finish budget resolve
//! instantly.

#![allow(clippy::unwrap_used)]

use shopwright::prelude::*;
use shopwright::scenarios::{catalog, select};
use std::sync::Arc;
use tempfile::TempDir;

const BASE_URL: &str = "https://shop.test";

fn runner(dir: &TempDir, workers: usize) -> SuiteRunner {
    let config = SuiteConfig::default()
        .with_base_url(BASE_URL)
        .with_screenshot_dir(dir.path())
        .with_retries(0);
    let factory = Arc::new(MockSessionFactory::new(BASE_URL));
    SuiteRunner::new(ScenarioFixture::new(factory, config)).with_workers(workers)
}

// ============================================================================
// Whole catalog
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_entire_catalog_passes() {
    let dir = TempDir::new().unwrap();
    let scenarios = catalog();
    let report = runner(&dir, 4).run("storefront", &scenarios).await;
    assert!(report.all_passed(), "{}", report.render_text());
    assert_eq!(report.total(), scenarios.len());
    assert_eq!(report.retries_used(), 0);
    assert!(report.screenshots().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sequential_and_parallel_agree() {
    let dir = TempDir::new().unwrap();
    let scenarios = select(Some("checkout"));
    let serial = runner(&dir, 1).run("serial", &scenarios).await;
    let parallel = runner(&dir, 8).run("parallel", &scenarios).await;
    let names = |r: &SuiteReport| r.results.iter().map(|o| (o.name.clone(), o.passed)).collect::<Vec<_>>();
    assert_eq!(names(&serial), names(&parallel));
}

// ============================================================================
// Personas
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_problem_user_suite_tolerates_stalled_checkout() {
    let dir = TempDir::new().unwrap();
    let report = runner(&dir, 2).run("problem", &select(Some("problem"))).await;
    assert!(report.all_passed(), "{}", report.render_text());
}

#[tokio::test(start_paused = true)]
async fn test_glitch_suite_waits_out_delay() {
    let dir = TempDir::new().unwrap();
    let report = runner(&dir, 2).run("glitch", &select(Some("glitch"))).await;
    assert!(report.all_passed(), "{}", report.render_text());
}

// ============================================================================
// Failure capture
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failing_scenario_reports_step_and_screenshot() {
    use futures::future::BoxFuture;

    fn badge_mismatch(ctx: &ScenarioContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            ctx.step("I navigate to the login page");
            ctx.pages.login.goto("/").await?;
            ctx.step("I login as standard user");
            ctx.pages.login.login(&User::STANDARD).await?;
            ctx.step("I add item at index 0 to cart");
            ctx.pages.inventory.add_item_to_cart(0).await?;
            ctx.step("the shopping cart badge should display \"2\"");
            let count = ctx.pages.inventory.cart_item_count().await;
            if count == 2 {
                Ok(())
            } else {
                Err(ShopError::assertion(format!("badge shows {count}")))
            }
        })
    }

    let dir = TempDir::new().unwrap();
    let scenarios = [shopwright::Scenario {
        name: "Inventory: badge",
        tags: &["inventory"],
        run: badge_mismatch,
    }];
    let report = runner(&dir, 1).run("failing", &scenarios).await;
    assert_eq!(report.failed_count(), 1);

    let failure = report.failures()[0];
    assert_eq!(failure.error.as_deref(), Some("Assertion failed: badge shows 1"));
    assert_eq!(
        failure.failed_step.as_deref(),
        Some("the shopping cart badge should display \"2\"")
    );
    let shot = failure.screenshot.as_ref().unwrap();
    assert!(shot.starts_with(dir.path()));
    assert!(shot
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Inventory_ badge_the shopping cart badge should display _2_"));
}

#[tokio::test(start_paused = true)]
async fn test_report_json_lists_every_outcome() {
    let dir = TempDir::new().unwrap();
    let report = runner(&dir, 2).run("login", &select(Some("login"))).await;
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["driver"], "mock");
    assert_eq!(json["results"].as_array().unwrap().len(), report.total());
}
