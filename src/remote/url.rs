//! Repository reference parsing.
//!
//! Accepted forms:
//! - `https://host/owner/repo` and `https://host/owner/repo.git`
//! - `git@host:owner/repo.git`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a clone or browse URL.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (host, path) = if let Some(rest) = url.strip_prefix("https://") {
            rest.split_once('/')
                .ok_or_else(|| invalid(url, "missing owner/repo path"))?
        } else if let Some(rest) = url.strip_prefix("git@") {
            rest.split_once(':')
                .ok_or_else(|| invalid(url, "missing ':' after host"))?
        } else {
            return Err(invalid(url, "expected https://host/owner/repo or git@host:owner/repo.git"));
        };

        if host.is_empty() || host.contains(['@', ' ']) {
            return Err(invalid(url, "bad host"));
        }

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments = path.split('/');
        let (Some(owner), Some(name), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(invalid(url, "path must be owner/repo"));
        };
        if !is_segment(owner) || !is_segment(name) {
            return Err(invalid(url, "owner and repo must be non-empty names"));
        }

        Ok(Self::new(host.to_ascii_lowercase(), owner, name))
    }

    /// `owner/name`, as used in API paths.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}

fn is_segment(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn invalid(url: &str, reason: &str) -> SweepError {
    SweepError::Validation(format!("repo-url {url:?} is not a valid repository url ({reason})"))
}
