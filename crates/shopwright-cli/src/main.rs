//! Shopwright CLI: run the storefront scenario suite
//!
//! ## Usage
//!
//! ```bash
//! shopwright list --filter checkout        # List matching scenarios
//! shopwright run --driver mock             # Run against the in-memory storefront
//! shopwright run -j 4 --report json        # Four workers, JSON report
//! shopwright config                        # Show resolved configuration
//! shopwright cleanup                       # Kill lingering CDP browsers
//! ```

use clap::Parser;
use shopwright::SuiteConfig;
use shopwright_cli::runner::{
    cleanup_browsers, render_config, render_list, render_report, resolve_config, run_suite,
    write_report,
};
use shopwright_cli::{
    logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, DriverArg,
    ProgressReporter, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    match cli.command {
        Commands::List(args) => {
            print!("{}", render_list(args.filter.as_deref()));
            Ok(())
        }
        Commands::Run(args) => run_scenarios(&config, &args),
        Commands::Config(args) => {
            print!("{}", render_config(&SuiteConfig::load()?, args.json)?);
            Ok(())
        }
        Commands::Cleanup => {
            let reporter =
                ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
            if cleanup_browsers() == 0 {
                reporter.warning("no lingering browser processes found");
            } else {
                reporter.success("lingering browser processes killed");
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_json_logs(cli.json_logs)
}

fn run_scenarios(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let suite_config = resolve_config(SuiteConfig::load()?, args);
    let cleanup = suite_config.cleanup_browsers && args.driver == DriverArg::Chromium;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_suite(config, suite_config, args));
    if cleanup {
        cleanup_browsers();
    }
    let report = report?;

    let rendered = render_report(&report, args.report)?;
    match &args.output {
        Some(dir) => {
            let path = write_report(&rendered, args.report, dir)?;
            if !config.verbosity.is_quiet() {
                println!("report written to {}", path.display());
            }
        }
        None => print!("{rendered}"),
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.total(),
        })
    }
}
