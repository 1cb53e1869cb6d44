//! Deletion of qualified branches.
//!
//! Whether a run really deletes is decided once, by picking a
//! [`BranchDeleter`]; the reporting path is the same for both.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::idle::IdleCutoff;
use crate::cli::output::Console;
use crate::error::Result;
use crate::remote::RemoteRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeletionStatus {
    Deleted,
    SkippedDryRun,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub branch: String,
    pub last_commit: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub status: DeletionStatus,
}

/// Deletion strategy.
pub trait BranchDeleter {
    fn delete(&self, repo: &dyn RemoteRepository, branch: &str) -> Result<DeletionStatus>;
}

/// Deletes through the hosting API.
pub struct RemoteDeleter;

impl BranchDeleter for RemoteDeleter {
    fn delete(&self, repo: &dyn RemoteRepository, branch: &str) -> Result<DeletionStatus> {
        repo.delete_branch(branch)?;
        info!(branch, "deleted");
        Ok(DeletionStatus::Deleted)
    }
}

/// Reports what would be deleted without touching the repository.
pub struct DryRunDeleter;

impl BranchDeleter for DryRunDeleter {
    fn delete(&self, _repo: &dyn RemoteRepository, branch: &str) -> Result<DeletionStatus> {
        info!(branch, "dry-run: not deleted");
        Ok(DeletionStatus::SkippedDryRun)
    }
}

#[must_use]
pub fn deleter_for(dry_run: bool) -> Box<dyn BranchDeleter> {
    if dry_run {
        Box::new(DryRunDeleter)
    } else {
        Box::new(RemoteDeleter)
    }
}

/// Process `qualified` in order, one branch at a time.
///
/// A branch that cannot be fetched or deleted is recorded as failed and the
/// next branch is still attempted. Only console write errors abort.
pub fn delete_branches<W: Write>(
    repo: &dyn RemoteRepository,
    deleter: &dyn BranchDeleter,
    cutoff: &IdleCutoff,
    qualified: &[String],
    console: &mut Console<W>,
) -> Result<Vec<DeletionOutcome>> {
    console.deletion_header(&cutoff.cutoff)?;
    if qualified.is_empty() {
        console.nothing_to_delete()?;
        return Ok(Vec::new());
    }

    let mut outcomes = Vec::with_capacity(qualified.len());
    for name in qualified {
        let outcome = delete_one(repo, deleter, name);
        console.outcome(&outcome)?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn delete_one(repo: &dyn RemoteRepository, deleter: &dyn BranchDeleter, name: &str) -> DeletionOutcome {
    let branch = match repo.get_branch(name) {
        Ok(branch) => branch,
        Err(err) => {
            warn!(branch = name, error = %err, "could not fetch branch");
            return DeletionOutcome {
                branch: name.to_string(),
                last_commit: None,
                status: DeletionStatus::Failed {
                    reason: err.to_string(),
                },
            };
        }
    };

    let status = deleter.delete(repo, name).unwrap_or_else(|err| {
        warn!(branch = name, error = %err, "delete failed");
        DeletionStatus::Failed {
            reason: err.to_string(),
        }
    });

    DeletionOutcome {
        branch: name.to_string(),
        last_commit: Some(branch.last_commit),
        status,
    }
}
