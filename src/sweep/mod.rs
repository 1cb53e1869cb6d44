//! The sweep pipeline: validate, resolve exemptions, filter idle branches,
//! delete.

pub mod execute;
pub mod exempt;
pub mod idle;
pub mod validate;

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

pub use execute::{
    BranchDeleter, DeletionOutcome, DeletionStatus, DryRunDeleter, RemoteDeleter, delete_branches,
    deleter_for,
};
pub use exempt::{ExemptReason, ExemptionSet, resolve_exemptions};
pub use idle::{IdleCutoff, Qualification, qualify_branches};
pub use validate::{RepoTarget, SweepPlan, validate};

use crate::cli::output::Console;
use crate::error::Result;
use crate::remote::RemoteRepository;

/// Everything one run decided and did.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub repository: String,
    pub dry_run: bool,
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub max_idle_days: u32,
    pub total_branches: usize,
    pub exempt: ExemptionSet,
    pub outcomes: Vec<DeletionOutcome>,
}

impl SweepSummary {
    fn count(&self, pred: impl Fn(&DeletionStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(|status| matches!(status, DeletionStatus::Deleted))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, DeletionStatus::SkippedDryRun))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, DeletionStatus::Failed { .. }))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Run resolution, filtering and deletion against an already validated plan.
pub fn run_sweep<W: Write>(
    repo: &dyn RemoteRepository,
    plan: &SweepPlan,
    dry_run: bool,
    now: DateTime<Utc>,
    console: &mut Console<W>,
) -> Result<SweepSummary> {
    let exempt = resolve_exemptions(repo, plan.exclusions.clone())?;
    info!(count = exempt.len(), "resolved exemptions");

    let cutoff = IdleCutoff::new(now, plan.max_idle_days)?;
    console.current_time(&cutoff.now)?;

    let qualification = qualify_branches(repo, &exempt, &cutoff, console)?;
    info!(
        total = qualification.total,
        qualified = qualification.qualified.len(),
        "filtered idle branches"
    );

    let deleter = deleter_for(dry_run);
    let outcomes = delete_branches(
        repo,
        deleter.as_ref(),
        &cutoff,
        &qualification.qualified,
        console,
    )?;

    let summary = SweepSummary {
        repository: repo.full_name(),
        dry_run,
        now: cutoff.now,
        cutoff: cutoff.cutoff,
        max_idle_days: cutoff.max_idle_days,
        total_branches: qualification.total,
        exempt,
        outcomes,
    };
    console.finish(&summary)?;
    Ok(summary)
}
