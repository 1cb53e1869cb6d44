//! E2E Scenario: Sweep Workflow
//!
//! Runs the binary against a mock GitHub covering:
//! - Dry-run (default) reports without deleting
//! - Real deletion of stale, unexempt branches only
//! - Nothing to delete
//! - A failing deletion that does not stop the rest
//! - Robot JSON summary
//! - Rejected credentials

use httpmock::prelude::*;
use serde_json::{Value, json};

use super::common::{branch, mount_repo, protected, repo_path};
use super::fixture::E2EFixture;

fn standard_branches() -> Vec<super::common::FakeBranch> {
    vec![
        branch("main", 40),
        protected("release"),
        branch("stale", 30),
        branch("fresh", 1),
        branch("in-review", 30),
        branch("kept", 30),
    ]
}

#[test]
fn dry_run_is_the_default() {
    let fixture = E2EFixture::new("dry_run_default");
    let mounted = mount_repo(
        &fixture.server,
        "main",
        &standard_branches(),
        &[("main", "in-review")],
    );

    let output = fixture.run_sweep(&["--exclude-branch", "kept", "--max-idle-days", "7"]);
    fixture.assert_success(&output, "sweep");

    let out = E2EFixture::stdout(&output);
    assert!(out.contains("Starting to Delete GitHub Branches"));
    assert!(out.contains("dry-run: true"));
    assert!(out.contains("Current Time (UTC):"));
    assert!(out.contains("Total Number of Branches              : 6"));
    assert!(out.contains("Total Number of Branches To Be Deleted: 1"));
    assert!(out.contains("(dry-run, last update"));
    assert!(out.contains(": stale"));

    for delete in mounted.deletes.values() {
        delete.assert_hits(0);
    }
}

#[test]
fn deletes_only_stale_unexempt_branches() {
    let fixture = E2EFixture::new("real_delete");
    let mounted = mount_repo(
        &fixture.server,
        "main",
        &standard_branches(),
        &[("main", "in-review")],
    );

    let output = fixture.run_sweep(&[
        "--dry-run",
        "false",
        "--exclude-branch",
        "kept",
        "--max-idle-days",
        "7",
    ]);
    fixture.assert_success(&output, "sweep");

    mounted.deletes["stale"].assert();
    for name in ["main", "release", "fresh", "in-review", "kept"] {
        mounted.deletes[name].assert_hits(0);
    }
    let out = E2EFixture::stdout(&output);
    assert!(out.contains("✅ Deleted branch (last update"));
    assert!(out.contains("1 deleted, 0 skipped (dry-run), 0 failed"));
}

#[test]
fn reports_nothing_to_delete() {
    let fixture = E2EFixture::new("nothing_to_delete");
    mount_repo(
        &fixture.server,
        "main",
        &[branch("main", 1), branch("fresh", 2)],
        &[],
    );

    let output = fixture.run_sweep(&["--dry-run", "false", "--max-idle-days", "7"]);
    fixture.assert_success(&output, "sweep");

    let out = E2EFixture::stdout(&output);
    assert!(out.contains("There is no qualified branch to delete"));
    assert!(!out.contains("✅"));
}

#[test]
fn failed_delete_continues_and_exits_one() {
    let fixture = E2EFixture::new("failed_delete");
    let mut mounted = mount_repo(
        &fixture.server,
        "main",
        &[branch("main", 1), branch("locked", 30), branch("stale", 30)],
        &[],
    );
    if let Some(mut locked) = mounted.deletes.remove("locked") {
        locked.delete();
    }
    fixture.server.mock(|when, then| {
        when.method(DELETE).path(repo_path("/git/refs/heads/locked"));
        then.status(422)
            .json_body(json!({"message": "Reference update failed"}));
    });

    let output = fixture.run_sweep(&["--dry-run", "false", "--max-idle-days", "7"]);
    assert_eq!(output.status.code(), Some(1));

    mounted.deletes["stale"].assert();
    let out = E2EFixture::stdout(&output);
    assert!(out.contains("❌ Failed to delete branch locked"));
    assert!(out.contains("1 deleted, 0 skipped (dry-run), 1 failed"));
}

#[test]
fn robot_summary_is_json() {
    let fixture = E2EFixture::new("robot_summary");
    mount_repo(
        &fixture.server,
        "main",
        &standard_branches(),
        &[("dev", "in-review")],
    );

    let output = fixture.run_sweep(&["--robot", "--dry-run", "false", "--max-idle-days", "7"]);
    fixture.assert_success(&output, "sweep");

    let json: Value = serde_json::from_slice(&output.stdout).expect("robot output is json");
    assert_eq!(json["status"], "ok");
    let data = &json["data"];
    assert_eq!(data["dry_run"], false);
    assert_eq!(data["total_branches"], 6);
    assert_eq!(data["max_idle_days"], 7);
    assert_eq!(data["exempt"]["main"], "default");
    assert_eq!(data["exempt"]["release"], "protected");
    assert_eq!(data["exempt"]["dev"], "pull_request_base");
    assert_eq!(data["exempt"]["in-review"], "pull_request_head");

    let deleted: Vec<&str> = data["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["branch"].as_str().unwrap())
        .collect();
    assert_eq!(deleted, vec!["stale", "kept"]);
}

#[test]
fn rejected_token_exits_one() {
    let fixture = E2EFixture::new("rejected_token");
    fixture.server.mock(|when, then| {
        when.method(GET).path(repo_path(""));
        then.status(401).json_body(json!({"message": "Bad credentials"}));
    });

    let output = fixture.run_sweep(&["--max-idle-days", "5"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("authentication rejected"));
}
