//! Console reporting.
//!
//! Human mode writes the line-oriented report operators read during a sweep.
//! Robot mode stays silent until the end and prints one JSON document.

use std::io::{self, Stdout, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::colors::{ColorSupport, SweepStyles, styled};
use crate::error::{Result, SweepError};
use crate::sweep::{DeletionOutcome, DeletionStatus, SweepSummary};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const NOTHING_TO_DELETE: &str = "There is no qualified branch to delete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Robot,
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error { code: String, message: String },
    Partial { completed: usize, failed: usize },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

pub fn robot_error(
    code: impl Into<String>,
    message: impl Into<String>,
) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::Error {
            code: code.into(),
            message: message.into(),
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
    }
}

#[must_use]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Report sink shared by every sweep stage.
pub struct Console<W: Write> {
    out: W,
    mode: OutputMode,
    colors: ColorSupport,
}

impl Console<Stdout> {
    #[must_use]
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(io::stdout(), mode, ColorSupport::detect())
    }
}

impl<W: Write> Console<W> {
    pub const fn new(out: W, mode: OutputMode, colors: ColorSupport) -> Self {
        Self { out, mode, colors }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        if self.mode == OutputMode::Human {
            writeln!(self.out, "{}", text.as_ref())?;
        }
        Ok(())
    }

    pub fn banner(
        &mut self,
        dry_run: bool,
        repo_url: &str,
        exclusions: &[String],
        max_idle_days: &str,
    ) -> Result<()> {
        let c = self.colors;
        let line = format!(
            "\n🚀 Starting to Delete GitHub Branches (dry-run: {}, repo-url: {}, exclude-branches: {}, max-idle-days: {})\n",
            styled(dry_run.to_string(), SweepStyles::param, c),
            styled(repo_url, SweepStyles::param, c),
            styled(format!("{exclusions:?}"), SweepStyles::param, c),
            styled(max_idle_days, SweepStyles::param, c),
        );
        self.line(line)
    }

    pub fn current_time(&mut self, now: &DateTime<Utc>) -> Result<()> {
        self.line(format!("Current Time (UTC): {}", format_time(now)))
    }

    pub fn branch_totals(&mut self, total: usize, qualified: usize) -> Result<()> {
        self.line(format!("\nTotal Number of Branches              : {total}"))?;
        self.line(format!("Total Number of Branches To Be Deleted: {qualified}"))
    }

    pub fn deletion_header(&mut self, cutoff: &DateTime<Utc>) -> Result<()> {
        self.line(format!(
            "\nDeleting Branch(es) older than {}",
            format_time(cutoff)
        ))?;
        self.line("-".repeat(51))
    }

    pub fn outcome(&mut self, outcome: &DeletionOutcome) -> Result<()> {
        let c = self.colors;
        let last_update = outcome
            .last_commit
            .as_ref()
            .map_or_else(|| "unknown".to_string(), format_time);
        let branch = styled(&outcome.branch, SweepStyles::branch, c);
        let line = match &outcome.status {
            DeletionStatus::Deleted => format!(
                "{} (last update {last_update}): {branch}",
                styled("✅ Deleted branch", SweepStyles::success, c)
            ),
            DeletionStatus::SkippedDryRun => format!(
                "{} ({}, last update {last_update}): {branch}",
                styled("✅ Deleted branch", SweepStyles::success, c),
                styled("dry-run", SweepStyles::warning, c)
            ),
            DeletionStatus::Failed { reason } => format!(
                "{} {branch}: {reason}",
                styled("❌ Failed to delete branch", SweepStyles::error, c)
            ),
        };
        self.line(line)
    }

    pub fn nothing_to_delete(&mut self) -> Result<()> {
        self.line(NOTHING_TO_DELETE)
    }

    /// Closing tally, or the JSON document in robot mode.
    pub fn finish(&mut self, summary: &SweepSummary) -> Result<()> {
        if self.mode == OutputMode::Robot {
            let failed = summary.failed();
            let mut response = robot_ok(summary);
            if failed > 0 {
                response.status = RobotStatus::Partial {
                    completed: summary.outcomes.len() - failed,
                    failed,
                };
            }
            return self.json(&response);
        }

        let c = self.colors;
        self.line(format!(
            "\n{} deleted, {} skipped (dry-run), {} failed",
            summary.deleted(),
            summary.skipped(),
            summary.failed()
        ))?;
        self.line(format!("\n{}", styled("Notes", SweepStyles::bold, c)))?;
        self.line(styled("* the default branch is never deleted", SweepStyles::muted, c))?;
        self.line(styled("* protected branches are never deleted", SweepStyles::muted, c))?;
        self.line(styled(
            "* branches used by open pull requests are never deleted\n",
            SweepStyles::muted,
            c,
        ))
    }

    /// Report a fatal error: JSON on stdout in robot mode, stderr otherwise.
    pub fn error(&mut self, err: &SweepError) {
        if self.mode == OutputMode::Robot {
            if let Err(write_err) = self.json(&robot_error(err.code(), err.to_string())) {
                eprintln!("❌ Error: {err} (robot output failed: {write_err})");
            }
        } else {
            eprintln!(
                "{}",
                styled(format!("❌ Error: {err}"), SweepStyles::error, self.colors)
            );
        }
    }

    fn json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let payload = serde_json::to_string_pretty(value)?;
        writeln!(self.out, "{payload}")?;
        Ok(())
    }
}
