//! Command-line surface.

pub mod colors;
pub mod output;

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use output::OutputMode;

use crate::error::SweepError;

#[derive(Parser, Debug)]
#[command(
    name = "branch-sweep",
    version,
    about = "Delete stale GitHub branches",
    long_about = "Delete branches whose last commit is older than --max-idle-days.\n\
                  The default branch, protected branches and branches used by open \
                  pull requests are never deleted. Runs as a dry run unless \
                  --dry-run false is given."
)]
pub struct Cli {
    /// Report what would be deleted without deleting anything
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// Repository URL, e.g. https://github.com/{owner}/{repo}
    #[arg(long, value_name = "URL")]
    pub repo_url: String,

    /// Branch excluded from deletion (repeatable)
    #[arg(long = "exclude-branch", value_name = "BRANCH")]
    pub exclude_branch: Vec<String>,

    /// Delete branches idle for more than this many days
    #[arg(long, value_name = "DAYS", allow_hyphen_values = true)]
    pub max_idle_days: String,

    /// Path to a config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logs
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a JSON summary instead of the human report
    #[arg(long)]
    pub robot: bool,
}

impl Cli {
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        if self.robot {
            OutputMode::Robot
        } else {
            OutputMode::Human
        }
    }
}

/// Whether `--robot` was passed, for reporting errors before parsing succeeds.
pub fn robot_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .take_while(|arg| arg.as_ref() != "--")
        .any(|arg| arg.as_ref() == "--robot")
}

/// A clap usage error as a validation failure, without the usage block.
#[must_use]
pub fn usage_error(err: &clap::Error) -> SweepError {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    SweepError::Validation(message.trim_start_matches("error: ").to_string())
}
