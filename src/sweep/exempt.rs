//! Exemption resolution: the branch names a sweep must never delete.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::remote::RemoteRepository;

/// Why a branch is exempt. Only the first reason recorded is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptReason {
    Excluded,
    Default,
    Protected,
    PullRequestBase,
    PullRequestHead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExemptionSet {
    names: BTreeMap<String, ExemptReason>,
}

impl ExemptionSet {
    #[must_use]
    pub fn from_exclusions(exclusions: BTreeSet<String>) -> Self {
        exclusions
            .into_iter()
            .fold(Self::default(), |set, name| set.with(name, ExemptReason::Excluded))
    }

    /// Add `name`, keeping an earlier reason if it is already present.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, reason: ExemptReason) -> Self {
        self.names.entry(name.into()).or_insert(reason);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[must_use]
    pub fn reason(&self, name: &str) -> Option<ExemptReason> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}

/// Union of the user exclusions, the default branch, every protected branch
/// and both ends of every open pull request.
///
/// Branches and pull requests are enumerated in full.
pub fn resolve_exemptions(
    repo: &dyn RemoteRepository,
    exclusions: BTreeSet<String>,
) -> Result<ExemptionSet> {
    let exempt = ExemptionSet::from_exclusions(exclusions)
        .with(repo.default_branch(), ExemptReason::Default);
    let exempt = with_protected(repo, exempt)?;
    let exempt = with_pull_requests(repo, exempt)?;

    for name in exempt.names() {
        debug!(branch = name, reason = ?exempt.reason(name), "exempt");
    }
    Ok(exempt)
}

fn with_protected(repo: &dyn RemoteRepository, exempt: ExemptionSet) -> Result<ExemptionSet> {
    Ok(repo
        .list_branches()?
        .into_iter()
        .filter(|branch| branch.protected)
        .fold(exempt, |set, branch| set.with(branch.name, ExemptReason::Protected)))
}

fn with_pull_requests(repo: &dyn RemoteRepository, exempt: ExemptionSet) -> Result<ExemptionSet> {
    Ok(repo.list_open_pulls()?.into_iter().fold(exempt, |set, pull| {
        set.with(pull.base, ExemptReason::PullRequestBase)
            .with(pull.head, ExemptReason::PullRequestHead)
    }))
}
