//! In-memory repository for exercising the sweep without a network.

use std::cell::RefCell;
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SweepError};
use crate::remote::{Branch, PullRequest, RemoteRepository};

/// How many times each repository operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_branches: usize,
    pub get_branch: usize,
    pub list_open_pulls: usize,
    pub delete: usize,
}

/// A repository whose branches are fixed at construction. Deleted branches
/// disappear from later listings. All idle ages are relative to one frozen
/// [`FakeRepository::now`].
pub struct FakeRepository {
    now: DateTime<Utc>,
    default_branch: String,
    branches: RefCell<Vec<Branch>>,
    pulls: Vec<PullRequest>,
    failing: BTreeSet<String>,
    deleted: RefCell<Vec<String>>,
    calls: RefCell<CallCounts>,
}

impl FakeRepository {
    #[must_use]
    pub fn new(default_branch: &str) -> Self {
        Self::at(Utc::now(), default_branch)
    }

    #[must_use]
    pub fn at(now: DateTime<Utc>, default_branch: &str) -> Self {
        Self {
            now,
            default_branch: default_branch.to_string(),
            branches: RefCell::new(Vec::new()),
            pulls: Vec::new(),
            failing: BTreeSet::new(),
            deleted: RefCell::new(Vec::new()),
            calls: RefCell::new(CallCounts::default()),
        }
    }

    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Unprotected branch whose last commit is `days` days before `now`.
    #[must_use]
    pub fn branch_idle(self, name: &str, days: i64) -> Self {
        let last_commit = self.now - Duration::days(days);
        self.branch(Branch {
            name: name.to_string(),
            protected: false,
            last_commit,
        })
    }

    /// Protected branch that has been idle for a year.
    #[must_use]
    pub fn branch_protected(self, name: &str) -> Self {
        let last_commit = self.now - Duration::days(365);
        self.branch(Branch {
            name: name.to_string(),
            protected: true,
            last_commit,
        })
    }

    #[must_use]
    pub fn branch(self, branch: Branch) -> Self {
        self.branches.borrow_mut().push(branch);
        self
    }

    #[must_use]
    pub fn pull(mut self, base: &str, head: &str) -> Self {
        self.pulls.push(PullRequest {
            base: base.to_string(),
            head: head.to_string(),
        });
        self
    }

    /// Make deletion of `name` fail with a remote error.
    #[must_use]
    pub fn fail_delete(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        *self.calls.borrow()
    }

    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }
}

impl RemoteRepository for FakeRepository {
    fn full_name(&self) -> String {
        "owner/repo".to_string()
    }

    fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        self.calls.borrow_mut().list_branches += 1;
        Ok(self.branches.borrow().clone())
    }

    fn get_branch(&self, name: &str) -> Result<Branch> {
        self.calls.borrow_mut().get_branch += 1;
        self.branches
            .borrow()
            .iter()
            .find(|branch| branch.name == name)
            .cloned()
            .ok_or_else(|| SweepError::NotFound(format!("branch {name}")))
    }

    fn list_open_pulls(&self) -> Result<Vec<PullRequest>> {
        self.calls.borrow_mut().list_open_pulls += 1;
        Ok(self.pulls.clone())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.calls.borrow_mut().delete += 1;
        if self.failing.contains(name) {
            return Err(SweepError::Remote {
                status: 422,
                message: format!("branch {name}: Reference update failed"),
            });
        }
        let mut branches = self.branches.borrow_mut();
        let before = branches.len();
        branches.retain(|branch| branch.name != name);
        if branches.len() == before {
            return Err(SweepError::NotFound(format!("branch {name}")));
        }
        self.deleted.borrow_mut().push(name.to_string());
        Ok(())
    }
}
