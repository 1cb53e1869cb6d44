//! branch-sweep CLI
//!
//! Delete stale GitHub branches past an idle cutoff.

use std::io::Stdout;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use branch_sweep::Result;
use branch_sweep::app::AppContext;
use branch_sweep::cli::{Cli, robot_requested, usage_error};
use branch_sweep::cli::output::{Console, OutputMode};
use branch_sweep::sweep::{SweepSummary, run_sweep};

fn main() -> ExitCode {
    // Any usage error is a validation failure: exit 1, not clap's 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() && robot_requested(std::env::args_os()) {
                Console::stdout(OutputMode::Robot).error(&usage_error(&err));
                return ExitCode::FAILURE;
            }
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(&cli);

    let mut console = Console::stdout(cli.output_mode());
    match run(&cli, &mut console) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            tracing::warn!(failed = summary.failed(), "some branches could not be deleted");
            ExitCode::FAILURE
        }
        Err(e) => {
            console.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, console: &mut Console<Stdout>) -> Result<SweepSummary> {
    console.banner(
        cli.dry_run,
        &cli.repo_url,
        &cli.exclude_branch,
        &cli.max_idle_days,
    )?;

    let ctx = AppContext::from_cli(cli)?;
    let plan = ctx.plan(cli)?;
    let repo = ctx.connect(plan.repo.clone())?;

    run_sweep(&repo, &plan, ctx.dry_run, Utc::now(), console)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,branch_sweep=info",
        1 => "info,branch_sweep=debug",
        2 => "debug,branch_sweep=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.output_mode() == OutputMode::Robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
