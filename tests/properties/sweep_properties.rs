use std::collections::{BTreeMap, BTreeSet};

use branch_sweep::cli::colors::ColorSupport;
use branch_sweep::cli::output::{Console, OutputMode};
use branch_sweep::sweep::{
    IdleCutoff, delete_branches, deleter_for, qualify_branches, resolve_exemptions,
};
use branch_sweep::test_utils::fixtures::FakeRepository;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

/// name -> (protected, idle days)
fn arb_branches() -> impl Strategy<Value = BTreeMap<String, (bool, i64)>> {
    prop::collection::btree_map("[a-z]{1,5}", (any::<bool>(), 0i64..60), 0..16)
}

fn arb_pulls() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z]{1,5}", "[a-z]{1,5}"), 0..6)
}

fn arb_exclusions() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z]{1,5}", 0..4)
}

fn build(
    default: &str,
    branches: &BTreeMap<String, (bool, i64)>,
    pulls: &[(String, String)],
) -> FakeRepository {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut repo = FakeRepository::at(now, default);
    for (name, (is_protected, days)) in branches {
        repo = if *is_protected {
            repo.branch_protected(name)
        } else {
            repo.branch_idle(name, *days)
        };
    }
    for (base, head) in pulls {
        repo = repo.pull(base, head);
    }
    repo
}

fn quiet_console() -> Console<Vec<u8>> {
    Console::new(Vec::new(), OutputMode::Human, ColorSupport::None)
}

proptest! {
    #[test]
    fn exemption_set_is_complete(
        default in "[a-z]{1,5}",
        branches in arb_branches(),
        pulls in arb_pulls(),
        exclusions in arb_exclusions(),
    ) {
        let repo = build(&default, &branches, &pulls);
        let exempt = resolve_exemptions(&repo, exclusions.clone()).unwrap();

        prop_assert!(exempt.contains(&default));
        for name in &exclusions {
            prop_assert!(exempt.contains(name));
        }
        for (name, (is_protected, _)) in &branches {
            if *is_protected {
                prop_assert!(exempt.contains(name));
            }
        }
        for (base, head) in &pulls {
            prop_assert!(exempt.contains(base));
            prop_assert!(exempt.contains(head));
        }

        // Nothing else sneaks in.
        for name in exempt.names() {
            let known = name == default
                || exclusions.contains(name)
                || branches.get(name).is_some_and(|(p, _)| *p)
                || pulls.iter().any(|(b, h)| b == name || h == name);
            prop_assert!(known, "unexpected exemption {}", name);
        }
    }

    #[test]
    fn qualification_matches_definition(
        branches in arb_branches(),
        exclusions in arb_exclusions(),
        days in 1u32..45,
    ) {
        let repo = build("main", &branches, &[]);
        let exempt = resolve_exemptions(&repo, exclusions).unwrap();
        let cutoff = IdleCutoff::new(repo.now(), days).unwrap();

        let result = qualify_branches(&repo, &exempt, &cutoff, &mut quiet_console()).unwrap();

        prop_assert_eq!(result.total, branches.len());
        let qualified: BTreeSet<&str> = result.qualified.iter().map(String::as_str).collect();
        for (name, (is_protected, idle)) in &branches {
            let idle_days = if *is_protected { 365 } else { *idle };
            let expected = !exempt.contains(name) && idle_days > i64::from(days);
            prop_assert_eq!(qualified.contains(name.as_str()), expected, "branch {}", name);
        }
    }

    #[test]
    fn dry_run_never_deletes(
        branches in arb_branches(),
        days in 1u32..45,
    ) {
        let repo = build("main", &branches, &[]);
        let exempt = resolve_exemptions(&repo, BTreeSet::new()).unwrap();
        let cutoff = IdleCutoff::new(repo.now(), days).unwrap();
        let mut console = quiet_console();
        let result = qualify_branches(&repo, &exempt, &cutoff, &mut console).unwrap();

        let deleter = deleter_for(true);
        let outcomes =
            delete_branches(&repo, deleter.as_ref(), &cutoff, &result.qualified, &mut console)
                .unwrap();

        prop_assert_eq!(repo.calls().delete, 0);
        prop_assert_eq!(outcomes.len(), result.qualified.len());
        let text = String::from_utf8(console.into_inner()).unwrap();
        prop_assert_eq!(text.matches("(dry-run, last update").count(), result.qualified.len());
    }
}
