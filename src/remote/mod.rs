//! Remote hosting access.
//!
//! The sweep pipeline only talks to a [`RemoteRepository`]. The GitHub REST
//! client is the production implementation; tests use the in-memory fake in
//! `test_utils::fixtures`.

pub mod auth;
pub mod github;
pub mod url;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use auth::Token;
pub use github::GitHubClient;
pub use url::RepoRef;

/// A branch as seen by the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub protected: bool,
    pub last_commit: DateTime<Utc>,
}

/// The branch names an open pull request points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub base: String,
    pub head: String,
}

/// Read and delete access to one hosted repository.
pub trait RemoteRepository {
    /// `owner/name` of the repository.
    fn full_name(&self) -> String;

    fn default_branch(&self) -> &str;

    /// Every branch, in the order the host returns them.
    fn list_branches(&self) -> Result<Vec<Branch>>;

    fn get_branch(&self, name: &str) -> Result<Branch>;

    fn list_open_pulls(&self) -> Result<Vec<PullRequest>>;

    fn delete_branch(&self, name: &str) -> Result<()>;
}
