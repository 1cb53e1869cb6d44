//! Common test utilities shared across integration tests.
//!
//! Mounts a small GitHub REST surface on an `httpmock` server so the real
//! client and the binary can be exercised end to end.

#![allow(dead_code)]

use std::collections::HashMap;

use chrono::{Duration, SecondsFormat, Utc};
use httpmock::Mock;
use httpmock::prelude::*;
use serde_json::{Value, json};

pub const OWNER: &str = "tagdots-dev";
pub const REPO: &str = "branch-test";
pub const TOKEN: &str = "test-token";

pub struct FakeBranch {
    pub name: &'static str,
    pub protected: bool,
    pub idle_days: i64,
}

pub const fn branch(name: &'static str, idle_days: i64) -> FakeBranch {
    FakeBranch {
        name,
        protected: false,
        idle_days,
    }
}

pub const fn protected(name: &'static str) -> FakeBranch {
    FakeBranch {
        name,
        protected: true,
        idle_days: 400,
    }
}

pub fn repo_path(suffix: &str) -> String {
    format!("/repos/{OWNER}/{REPO}{suffix}")
}

fn sha_for(name: &str) -> String {
    format!("sha-{}", name.replace('/', "-"))
}

fn commit_json(sha: &str, idle_days: i64) -> Value {
    let date = (Utc::now() - Duration::days(idle_days)).to_rfc3339_opts(SecondsFormat::Secs, true);
    json!({
        "sha": sha,
        "commit": {
            "author": {"name": "dev", "date": date},
            "committer": {"name": "dev", "date": date}
        }
    })
}

/// A mounted repository. `deletes` holds one DELETE mock per branch.
pub struct MountedRepo<'a> {
    pub repo: Mock<'a>,
    pub deletes: HashMap<&'static str, Mock<'a>>,
}

pub fn mount_repo<'a>(
    server: &'a MockServer,
    default_branch: &str,
    branches: &[FakeBranch],
    pulls: &[(&str, &str)],
) -> MountedRepo<'a> {
    let repo = server.mock(|when, then| {
        when.method(GET)
            .path(repo_path(""))
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .json_body(json!({"full_name": format!("{OWNER}/{REPO}"), "default_branch": default_branch}));
    });

    let listing: Vec<Value> = branches
        .iter()
        .map(|b| {
            json!({
                "name": b.name,
                "protected": b.protected,
                "commit": {"sha": sha_for(b.name), "url": "unused"}
            })
        })
        .collect();
    server.mock(|when, then| {
        when.method(GET).path(repo_path("/branches"));
        then.status(200).json_body(Value::Array(listing));
    });

    let pull_list: Vec<Value> = pulls
        .iter()
        .map(|(base, head)| json!({"base": {"ref": base}, "head": {"ref": head}}))
        .collect();
    server.mock(|when, then| {
        when.method(GET)
            .path(repo_path("/pulls"))
            .query_param("state", "open");
        then.status(200).json_body(Value::Array(pull_list));
    });

    let mut deletes = HashMap::new();
    for b in branches {
        let sha = sha_for(b.name);
        let commit = commit_json(&sha, b.idle_days);
        server.mock(|when, then| {
            when.method(GET).path(repo_path(&format!("/commits/{sha}")));
            then.status(200).json_body(commit.clone());
        });
        server.mock(|when, then| {
            when.method(GET)
                .path(repo_path(&format!("/branches/{}", b.name)));
            then.status(200).json_body(json!({
                "name": b.name,
                "protected": b.protected,
                "commit": commit
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path(repo_path(&format!("/git/refs/heads/{}", b.name)));
            then.status(204);
        });
        deletes.insert(b.name, delete);
    }

    MountedRepo { repo, deletes }
}

/// Config file pointing the client at `server`.
pub fn write_config(dir: &std::path::Path, server: &MockServer) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[github]\napi_url = \"{}\"\ntoken_env = \"GH_TOKEN\"\ntimeout_secs = 5\n",
            server.base_url()
        ),
    )
    .expect("write config");
    path
}
