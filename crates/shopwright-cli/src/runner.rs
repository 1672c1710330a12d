//! Command implementations

use crate::commands::{DriverArg, ReportFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use shopwright::scenarios;
use shopwright::{
    MockSessionFactory, ScenarioFixture, SessionFactory, SuiteConfig, SuiteReport, SuiteRunner,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Command lines of browsers started for remote debugging
pub const BROWSER_PROCESS_PATTERNS: [&str; 2] = [
    "chrome.*remote-debugging-port",
    "chromium.*remote-debugging-port",
];

/// Suite name used in reports
pub const SUITE_NAME: &str = "storefront";

/// Apply command-line overrides on top of the loaded configuration
#[must_use]
pub fn resolve_config(mut config: SuiteConfig, args: &RunArgs) -> SuiteConfig {
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(headless) = args.headless {
        config = config.with_headless(headless);
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(retries) = args.retries {
        config = config.with_retries(retries);
    }
    if let Some(output) = &args.output {
        config = config.with_screenshot_dir(output.join("screenshots"));
    }
    config
}

/// Session factory for the chosen driver
pub fn session_factory(driver: DriverArg, config: &SuiteConfig) -> CliResult<Arc<dyn SessionFactory>> {
    match driver {
        DriverArg::Mock => Ok(Arc::new(MockSessionFactory::new(config.base_url.as_str()))),
        #[cfg(feature = "browser")]
        DriverArg::Chromium => {
            let settings = shopwright::BrowserSettings::from_config(config);
            Ok(Arc::new(shopwright::ChromiumSessionFactory::new(settings)))
        }
        #[cfg(not(feature = "browser"))]
        DriverArg::Chromium => Err(CliError::config(
            "browser support not enabled. Rebuild with --features browser or use --driver mock",
        )),
    }
}

/// One line per scenario: name and tags
#[must_use]
pub fn render_list(filter: Option<&str>) -> String {
    let mut out = String::new();
    for scenario in scenarios::select(filter) {
        let _ = writeln!(out, "{}  [{}]", scenario.name, scenario.tags.join(", "));
    }
    out
}

/// Resolved configuration as text or JSON
pub fn render_config(config: &SuiteConfig, json: bool) -> CliResult<String> {
    if json {
        return serde_json::to_string_pretty(config)
            .map_err(|e| CliError::report_generation(e.to_string()));
    }
    let mut out = String::new();
    let _ = writeln!(out, "base_url:              {}", config.base_url);
    let _ = writeln!(out, "browser:               {}", config.browser);
    let _ = writeln!(out, "headless:              {}", config.headless);
    let _ = writeln!(out, "action_timeout_ms:     {}", config.action_timeout_ms);
    let _ = writeln!(out, "navigation_timeout_ms: {}", config.navigation_timeout_ms);
    let _ = writeln!(out, "retries:               {}", config.retries);
    let _ = writeln!(out, "workers:               {}", config.workers);
    let _ = writeln!(out, "screenshot_dir:        {}", config.screenshot_dir.display());
    let _ = writeln!(
        out,
        "chromium_path:         {}",
        config
            .chromium_path
            .as_deref()
            .map_or_else(|| "auto".to_string(), |p| p.display().to_string())
    );
    let _ = writeln!(out, "cleanup_browsers:      {}", config.cleanup_browsers);
    Ok(out)
}

/// Run the selected scenarios
pub async fn run_suite(cli: &CliConfig, config: SuiteConfig, args: &RunArgs) -> CliResult<SuiteReport> {
    let selected = scenarios::select(args.filter.as_deref());
    if selected.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no scenarios match {:?}",
            args.filter.as_deref().unwrap_or_default()
        )));
    }

    let factory = session_factory(args.driver, &config)?;
    let fixture = ScenarioFixture::new(factory, config);
    let runner = SuiteRunner::new(fixture);

    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.start(&format!(
        "running {} scenarios on {} workers",
        selected.len(),
        runner.workers()
    ));
    let report = runner.run(SUITE_NAME, &selected).await;
    reporter.finish();

    if args.report == ReportFormat::Json {
        for outcome in &report.results {
            reporter.outcome(outcome);
        }
    }
    reporter.summary(&report);
    Ok(report)
}

/// Render the report in `format`
pub fn render_report(report: &SuiteReport, format: ReportFormat) -> CliResult<String> {
    match format {
        ReportFormat::Text => Ok(report.render_text()),
        ReportFormat::Json => report
            .to_json()
            .map_err(|e| CliError::report_generation(e.to_string())),
    }
}

/// Write `rendered` to `<dir>/report.<ext>`
pub fn write_report(rendered: &str, format: ReportFormat, dir: &Path) -> CliResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("report.{}", format.extension()));
    std::fs::write(&path, rendered)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

/// Kill lingering CDP browser processes; returns how many patterns matched
#[cfg(unix)]
pub fn cleanup_browsers() -> usize {
    let mut matched = 0;
    for pattern in BROWSER_PROCESS_PATTERNS {
        match std::process::Command::new("pkill").args(["-f", pattern]).status() {
            Ok(status) if status.success() => {
                info!(pattern, "killed lingering browser processes");
                matched += 1;
            }
            Ok(_) => debug!(pattern, "no lingering browser processes"),
            Err(e) => warn!(pattern, error = %e, "could not run pkill"),
        }
    }
    matched
}

/// Kill lingering CDP browser processes; returns how many patterns matched
#[cfg(not(unix))]
pub fn cleanup_browsers() -> usize {
    warn!("browser cleanup is only supported on unix");
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["shopwright", "run"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_overrides_win() {
            let args = run_args(&[
                "--base-url", "https://shop.test/", "--headless", "false", "-j", "3",
                "--retries", "1", "--output", "out",
            ]);
            let config = resolve_config(SuiteConfig::default(), &args);
            assert_eq!(config.base_url, "https://shop.test");
            assert!(!config.headless);
            assert_eq!(config.workers, 3);
            assert_eq!(config.retries, 1);
            assert_eq!(config.screenshot_dir, PathBuf::from("out").join("screenshots"));
        }

        #[test]
        fn test_no_overrides_keeps_config() {
            let base = SuiteConfig::default().with_workers(2);
            assert_eq!(resolve_config(base.clone(), &run_args(&[])), base);
        }

        #[test]
        fn test_render_config_text_and_json() {
            let config = SuiteConfig::default();
            let text = render_config(&config, false).unwrap();
            assert!(text.contains("base_url:              https://qa-challenge.codesubmit.io"));
            assert!(text.contains("chromium_path:         auto"));
            let json: serde_json::Value =
                serde_json::from_str(&render_config(&config, true).unwrap()).unwrap();
            assert_eq!(json["workers"], 1);
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_list_filters() {
            let all = render_list(None);
            assert_eq!(all.lines().count(), scenarios::catalog().len());
            let sort = render_list(Some("sort"));
            assert!(sort.lines().all(|l| l.contains("sort")));
            assert!(render_list(Some("no-such-scenario")).is_empty());
        }
    }

    mod run_tests {
        use super::*;

        fn mock_config(dir: &Path) -> SuiteConfig {
            SuiteConfig::default()
                .with_base_url("https://shop.test")
                .with_screenshot_dir(dir)
        }

        #[tokio::test(start_paused = true)]
        async fn test_mock_run_passes() {
            let dir = tempfile::tempdir().unwrap();
            let args = run_args(&["--driver", "mock", "--filter", "cart"]);
            let cli = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
            let report = run_suite(&cli, mock_config(dir.path()), &args).await.unwrap();
            assert!(report.all_passed(), "{}", report.render_text());
            assert_eq!(report.driver, "mock");
        }

        #[tokio::test]
        async fn test_unknown_filter_is_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let args = run_args(&["--driver", "mock", "--filter", "no-such-scenario"]);
            let err = run_suite(&CliConfig::new(), mock_config(dir.path()), &args)
                .await
                .unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }

        #[test]
        fn test_write_report() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_report("{}", ReportFormat::Json, &dir.path().join("nested")).unwrap();
            assert_eq!(path.file_name().unwrap(), "report.json");
            assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
        }
    }
}
