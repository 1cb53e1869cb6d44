//! GitHub REST client.
//!
//! Blocking, sequential, no retries. Listing endpoints are followed through
//! their `Link: rel="next"` headers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{Branch, PullRequest, RemoteRepository, RepoRef, Token};
use crate::config::GitHubConfig;
use crate::error::{Result, SweepError};

const API_VERSION: &str = "2022-11-28";

pub struct GitHubClient {
    http: Client,
    api_base: String,
    repo: RepoRef,
    default_branch: String,
    per_page: u32,
    /// Committer dates by commit SHA, so repeated enumerations stay cheap.
    commit_dates: RefCell<HashMap<String, DateTime<Utc>>>,
}

impl GitHubClient {
    /// Authenticate and resolve the repository. Fails with
    /// [`SweepError::Auth`] when the host rejects the token.
    pub fn connect(repo: RepoRef, token: &Token, config: &GitHubConfig) -> Result<Self> {
        let api_base = config.api_base_for(&repo.host);
        let http = build_http(token, config.timeout_secs)?;

        let mut client = Self {
            http,
            api_base,
            repo,
            default_branch: String::new(),
            per_page: config.per_page,
            commit_dates: RefCell::new(HashMap::new()),
        };

        let url = client.repo_url("");
        let (meta, _) = client.get_json::<RepoResponse>(&url, "repository")?;
        client.default_branch = meta.default_branch;
        info!(
            repo = %client.repo,
            default_branch = %client.default_branch,
            "connected to repository"
        );
        Ok(client)
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{suffix}",
            self.api_base,
            urlencoding::encode(&self.repo.owner),
            urlencoding::encode(&self.repo.name)
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<(T, Option<String>)> {
        debug!(%url, "GET");
        let response = self.http.get(url).send()?;
        let response = check_status(response, what)?;
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_link);
        let body = response.json::<T>()?;
        Ok((body, next))
    }

    fn get_all<T: DeserializeOwned>(&self, first: String, what: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let (page, following) = self.get_json::<Vec<T>>(&url, what)?;
            items.extend(page);
            next = following;
        }
        Ok(items)
    }

    fn commit_date(&self, sha: &str) -> Result<DateTime<Utc>> {
        if let Some(date) = self.commit_dates.borrow().get(sha) {
            return Ok(*date);
        }
        let url = self.repo_url(&format!("/commits/{}", urlencoding::encode(sha)));
        let (commit, _) = self.get_json::<CommitResponse>(&url, &format!("commit {sha}"))?;
        let date = commit.commit.date(sha)?;
        self.commit_dates.borrow_mut().insert(sha.to_string(), date);
        Ok(date)
    }
}

impl RemoteRepository for GitHubClient {
    fn full_name(&self) -> String {
        self.repo.full_name()
    }

    fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        let first = self.repo_url(&format!("/branches?per_page={}", self.per_page));
        let listed: Vec<BranchListItem> = self.get_all(first, "branches")?;
        debug!(count = listed.len(), "listed branches");

        listed
            .into_iter()
            .map(|item| {
                let last_commit = self.commit_date(&item.commit.sha)?;
                Ok(Branch {
                    name: item.name,
                    protected: item.protected,
                    last_commit,
                })
            })
            .collect()
    }

    fn get_branch(&self, name: &str) -> Result<Branch> {
        let url = self.repo_url(&format!("/branches/{}", encode_ref(name)));
        let (detail, _) = self.get_json::<BranchDetail>(&url, &format!("branch {name}"))?;
        let last_commit = detail.commit.commit.date(&detail.commit.sha)?;
        self.commit_dates
            .borrow_mut()
            .insert(detail.commit.sha, last_commit);
        Ok(Branch {
            name: detail.name,
            protected: detail.protected,
            last_commit,
        })
    }

    fn list_open_pulls(&self) -> Result<Vec<PullRequest>> {
        let first = self.repo_url(&format!("/pulls?state=open&per_page={}", self.per_page));
        let pulls: Vec<PullItem> = self.get_all(first, "pull requests")?;
        debug!(count = pulls.len(), "listed open pull requests");
        Ok(pulls
            .into_iter()
            .map(|pull| PullRequest {
                base: pull.base.name,
                head: pull.head.name,
            })
            .collect())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let url = self.repo_url(&format!("/git/refs/heads/{}", encode_ref(name)));
        debug!(%url, "DELETE");
        let response = self.http.delete(&url).send()?;
        check_status(response, &format!("branch {name}"))?;
        Ok(())
    }
}

fn build_http(token: &Token, timeout_secs: u64) -> Result<Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
        .map_err(|_| SweepError::InvalidToken("token".to_string()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

    Client::builder()
        .default_headers(headers)
        .user_agent(concat!("branch-sweep/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|err| SweepError::Config(format!("github http client: {err}")))
}

fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiMessage>()
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());

    match status.as_u16() {
        401 | 403 => Err(SweepError::Auth(format!("{what}: {message}"))),
        404 => Err(SweepError::NotFound(what.to_string())),
        code => Err(SweepError::Remote {
            status: code,
            message: format!("{what}: {message}"),
        }),
    }
}

/// Extract the `rel="next"` target from a `Link` header.
#[must_use]
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| param.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(ToString::to_string)
    })
}

/// Percent-encode a branch name for use in a URL path, keeping `/`.
fn encode_ref(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchListItem {
    name: String,
    #[serde(default)]
    protected: bool,
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BranchDetail {
    name: String,
    #[serde(default)]
    protected: bool,
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitBody,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    #[serde(default)]
    committer: Option<Signature>,
    #[serde(default)]
    author: Option<Signature>,
}

impl CommitBody {
    fn date(&self, sha: &str) -> Result<DateTime<Utc>> {
        self.committer
            .as_ref()
            .or(self.author.as_ref())
            .map(|signature| signature.date)
            .ok_or_else(|| SweepError::NotFound(format!("commit date for {sha}")))
    }
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PullItem {
    base: PullRef,
    head: PullRef,
}

#[derive(Debug, Deserialize)]
struct PullRef {
    #[serde(rename = "ref")]
    name: String,
}
