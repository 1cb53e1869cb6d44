//! Shared test utilities for branch-sweep.

pub mod fixtures;

use crate::error::SweepError;
use crate::sweep::{RepoTarget, validate};

/// What a validation case should produce.
#[derive(Debug, Clone, Copy)]
pub enum Expect {
    /// A plan for `full_name` with the given day count and exclusion count.
    Plan {
        full_name: &'static str,
        days: u32,
        exclusions: usize,
    },
    /// A validation error whose message contains the fragment.
    Rejected(&'static str),
}

/// One row of an invocation table.
#[derive(Debug, Clone, Copy)]
pub struct ValidationCase {
    pub name: &'static str,
    pub exclusions: &'static [&'static str],
    pub repo_url: &'static str,
    pub max_idle_days: Option<&'static str>,
    pub expect: Expect,
}

impl ValidationCase {
    /// A case that only varies `--max-idle-days` against a valid repository.
    #[must_use]
    pub const fn days(name: &'static str, max_idle_days: Option<&'static str>, expect: Expect) -> Self {
        Self {
            name,
            exclusions: &[],
            repo_url: "https://github.com/owner/repo",
            max_idle_days,
            expect,
        }
    }
}

/// Run every case through [`validate`] against `hosts`, reporting the first
/// mismatch by case name.
pub fn check_validation_table(cases: &[ValidationCase], hosts: &[String]) -> Result<(), String> {
    for case in cases {
        println!("[TEST] Running: {}", case.name);
        let exclusions: Vec<String> = case.exclusions.iter().map(ToString::to_string).collect();
        let result = validate(
            &exclusions,
            RepoTarget::Url(case.repo_url),
            case.max_idle_days,
            hosts,
        );

        match (case.expect, result) {
            (
                Expect::Plan {
                    full_name,
                    days,
                    exclusions,
                },
                Ok(plan),
            ) => {
                if plan.repo.full_name() != full_name
                    || plan.max_idle_days != days
                    || plan.exclusions.len() != exclusions
                {
                    return Err(format!("{}: unexpected plan {plan:?}", case.name));
                }
            }
            (Expect::Rejected(fragment), Err(SweepError::Validation(message))) => {
                if !message.contains(fragment) {
                    return Err(format!(
                        "{}: message {message:?} lacks {fragment:?}",
                        case.name
                    ));
                }
            }
            (expect, result) => {
                return Err(format!(
                    "{}: expected {expect:?}, got {result:?}",
                    case.name
                ));
            }
        }
        println!("[TEST] PASSED: {}", case.name);
    }
    Ok(())
}
