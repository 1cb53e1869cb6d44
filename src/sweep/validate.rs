//! Invocation validation.
//!
//! Runs before any token lookup or network call. Everything the later stages
//! need comes out of here already typed: a [`RepoRef`], a set of excluded
//! branch names and a positive day count.

use std::collections::BTreeSet;

use crate::error::{Result, SweepError};
use crate::remote::RepoRef;

/// Longest idle window accepted, in days.
pub const MAX_IDLE_DAYS_LIMIT: u32 = 36_500;

/// Where the repository comes from.
#[derive(Debug, Clone)]
pub enum RepoTarget<'a> {
    /// A clone/browse URL that still has to be parsed.
    Url(&'a str),
    /// A reference resolved earlier.
    Resolved(RepoRef),
}

/// Validated inputs of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub repo: RepoRef,
    pub exclusions: BTreeSet<String>,
    pub max_idle_days: u32,
}

pub fn validate(
    exclusions: &[String],
    target: RepoTarget<'_>,
    max_idle_days: Option<&str>,
    hosts: &[String],
) -> Result<SweepPlan> {
    let exclusions = parse_exclusions(exclusions)?;
    let max_idle_days = parse_max_idle_days(max_idle_days)?;
    let repo = match target {
        RepoTarget::Resolved(repo) => repo,
        RepoTarget::Url(url) => {
            let repo = RepoRef::parse(url)?;
            if !hosts.iter().any(|host| host.eq_ignore_ascii_case(&repo.host)) {
                return Err(SweepError::Validation(format!(
                    "repo-url {url:?} is not on a recognized host (expected one of {})",
                    hosts.join(", ")
                )));
            }
            repo
        }
    };

    Ok(SweepPlan {
        repo,
        exclusions,
        max_idle_days,
    })
}

/// Turn repeated `--exclude-branch` values into a set. Empty names and names
/// containing whitespace are rejected; duplicates collapse.
pub fn parse_exclusions(raw: &[String]) -> Result<BTreeSet<String>> {
    raw.iter()
        .map(|name| {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                Err(SweepError::Validation(format!(
                    "exclude-branch {name:?} is not a valid branch name"
                )))
            } else {
                Ok(name.clone())
            }
        })
        .collect()
}

pub fn parse_max_idle_days(raw: Option<&str>) -> Result<u32> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SweepError::Validation("max-idle-days is required".to_string()))?;

    let days = raw.parse::<u32>().map_err(|_| {
        SweepError::Validation(format!(
            "max-idle-days must be a positive integer (got {raw:?})"
        ))
    })?;

    if days == 0 || days > MAX_IDLE_DAYS_LIMIT {
        return Err(SweepError::Validation(format!(
            "max-idle-days must be between 1 and {MAX_IDLE_DAYS_LIMIT} (got {days})"
        )));
    }
    Ok(days)
}
