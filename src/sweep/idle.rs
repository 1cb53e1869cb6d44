//! Idle filtering.

use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::exempt::ExemptionSet;
use crate::cli::output::Console;
use crate::error::{Result, SweepError};
use crate::remote::RemoteRepository;

/// `now - max_idle_days`. A branch is idle when its last commit is strictly
/// earlier than `cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdleCutoff {
    pub now: DateTime<Utc>,
    pub max_idle_days: u32,
    pub cutoff: DateTime<Utc>,
}

impl IdleCutoff {
    pub fn new(now: DateTime<Utc>, max_idle_days: u32) -> Result<Self> {
        let cutoff = Duration::try_days(i64::from(max_idle_days))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| {
                SweepError::Validation(format!(
                    "max-idle-days {max_idle_days} reaches before the earliest representable time"
                ))
            })?;
        Ok(Self {
            now,
            max_idle_days,
            cutoff,
        })
    }

    #[must_use]
    pub fn is_idle(&self, last_commit: &DateTime<Utc>) -> bool {
        self.cutoff > *last_commit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualification {
    /// Branch names eligible for deletion, in enumeration order.
    pub qualified: Vec<String>,
    /// Every branch enumerated, qualified or not.
    pub total: usize,
}

pub fn qualify_branches<W: Write>(
    repo: &dyn RemoteRepository,
    exempt: &ExemptionSet,
    cutoff: &IdleCutoff,
    console: &mut Console<W>,
) -> Result<Qualification> {
    let mut result = Qualification::default();
    for branch in repo.list_branches()? {
        result.total += 1;
        if exempt.contains(&branch.name) {
            continue;
        }
        if cutoff.is_idle(&branch.last_commit) {
            debug!(branch = %branch.name, last_commit = %branch.last_commit, "qualified");
            result.qualified.push(branch.name);
        }
    }

    console.branch_totals(result.total, result.qualified.len())?;
    Ok(result)
}
