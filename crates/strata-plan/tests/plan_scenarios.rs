use std::collections::{BTreeMap, BTreeSet};

use strata_core::{Commit, CommitHash};
use strata_plan::{prepare_run_plan, BranchId, RunAction};

fn h(b: u8) -> CommitHash {
    CommitHash::from_bytes([b; 20])
}

fn commit(hash: u8, parents: &[u8]) -> Commit {
    Commit {
        hash: h(hash),
        parents: parents.iter().map(|p| h(*p)).collect(),
        committed_at_ms: hash as u64,
    }
}

fn c(hash: u8, branch: u32) -> RunAction {
    RunAction::Commit { hash: h(hash), branch: BranchId(branch) }
}

fn fork(branches: &[u32]) -> RunAction {
    RunAction::Fork { branches: branches.iter().map(|b| BranchId(*b)).collect() }
}

fn merge(branches: &[u32]) -> RunAction {
    RunAction::Merge { branches: branches.iter().map(|b| BranchId(*b)).collect() }
}

fn delete(branch: u32) -> RunAction {
    RunAction::Delete { branch: BranchId(branch) }
}

#[test]
fn linear_history_of_three_commits() {
    let plan =
        prepare_run_plan(&[commit(1, &[]), commit(2, &[1]), commit(3, &[2])]).unwrap();
    assert_eq!(plan, vec![c(1, 0), c(2, 0), c(3, 0)]);
}

#[test]
fn fork_and_merge() {
    let plan = prepare_run_plan(&[
        commit(1, &[]),
        commit(2, &[1]),
        commit(3, &[1]),
        commit(4, &[2, 3]),
    ])
    .unwrap();
    assert_eq!(
        plan,
        vec![
            c(1, 0),
            fork(&[0, 1]),
            c(2, 0),
            c(3, 1),
            c(4, 0),
            c(4, 1),
            merge(&[0, 1]),
            delete(1),
        ]
    );
}

#[test]
fn fast_forward_merge_collapses() {
    // 1 -> 2 -> 4 plus the direct edge 1 -> 4.
    let plan =
        prepare_run_plan(&[commit(1, &[]), commit(2, &[1]), commit(4, &[1, 2])]).unwrap();
    assert_eq!(plan, vec![c(1, 0), c(2, 0), c(4, 0)]);
}

#[test]
fn disjoint_component_is_dropped() {
    let mut commits: Vec<Commit> = Vec::new();
    commits.push(commit(1, &[]));
    for i in 2..=100u8 {
        commits.push(commit(i, &[i - 1]));
    }
    // A two-commit island, disconnected from the main history.
    commits.push(commit(200, &[]));
    commits.push(commit(201, &[200]));

    let plan = prepare_run_plan(&commits).unwrap();
    assert_eq!(plan.len(), 100);
    for action in &plan {
        match action {
            RunAction::Commit { hash, branch } => {
                assert_eq!(*branch, BranchId::ROOT);
                assert_ne!(*hash, h(200));
                assert_ne!(*hash, h(201));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}

#[test]
fn empty_input_yields_empty_plan() {
    assert!(prepare_run_plan(&[]).unwrap().is_empty());
}

#[test]
fn plans_are_deterministic_across_runs_and_input_order() {
    let commits = branching_history();
    let plan1 = prepare_run_plan(&commits).unwrap();
    let plan2 = prepare_run_plan(&commits).unwrap();
    let mut reversed = commits.clone();
    reversed.reverse();
    let plan3 = prepare_run_plan(&reversed).unwrap();

    let bytes1 = serde_json::to_vec(&plan1).unwrap();
    let bytes2 = serde_json::to_vec(&plan2).unwrap();
    let bytes3 = serde_json::to_vec(&plan3).unwrap();
    assert_eq!(bytes1, bytes2);
    assert_eq!(bytes1, bytes3);
}

#[test]
fn plan_serialization_roundtrip() {
    let plan = prepare_run_plan(&branching_history()).unwrap();
    let bytes = serde_json::to_vec(&plan).unwrap();
    let back: Vec<RunAction> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(plan, back);
}

/// Two stacked diamonds with a trailing chain; every forked lane carries at
/// least two commits so no branch is optimised away.
fn branching_history() -> Vec<Commit> {
    vec![
        commit(1, &[]),
        commit(2, &[1]),
        commit(3, &[1]),
        commit(4, &[2]),
        commit(5, &[3]),
        commit(6, &[4, 5]),
        commit(7, &[6]),
        commit(8, &[6]),
        commit(9, &[7]),
        commit(10, &[8]),
        commit(11, &[9, 10]),
        commit(12, &[11]),
    ]
}

#[test]
fn every_commit_lands_on_exactly_one_branch_except_merges() {
    let commits = branching_history();
    let by_hash: BTreeMap<CommitHash, &Commit> =
        commits.iter().map(|c| (c.hash, c)).collect();
    let plan = prepare_run_plan(&commits).unwrap();

    let mut counts: BTreeMap<CommitHash, usize> = BTreeMap::new();
    for action in &plan {
        if let RunAction::Commit { hash, .. } = action {
            *counts.entry(*hash).or_insert(0) += 1;
        }
    }
    for commit in &commits {
        let count = counts.get(&commit.hash).copied().unwrap_or(0);
        let in_set_parents = commit
            .parents
            .iter()
            .filter(|p| by_hash.contains_key(p))
            .count();
        if in_set_parents > 1 {
            assert!(
                (1..=in_set_parents).contains(&count),
                "merge {} appeared {count} times",
                commit.hash
            );
        } else {
            assert_eq!(count, 1, "commit {} appeared {count} times", commit.hash);
        }
    }
}

#[test]
fn every_branch_is_root_or_forked_into() {
    let plan = prepare_run_plan(&branching_history()).unwrap();
    let mut forked: BTreeSet<BranchId> = BTreeSet::new();
    for action in &plan {
        // A Fork's trailing ids are being created, not used.
        let used: Vec<BranchId> = match action {
            RunAction::Commit { branch, .. } | RunAction::Delete { branch } => vec![*branch],
            RunAction::Fork { branches } => vec![branches[0]],
            RunAction::Merge { branches } => branches.clone(),
        };
        for b in used {
            assert!(
                b == BranchId::ROOT || forked.contains(&b),
                "branch {b} used before it was forked"
            );
        }
        if let RunAction::Fork { branches } = action {
            assert!(!branches[1..].contains(&BranchId::ROOT), "root forked into");
            forked.extend(branches[1..].iter().copied());
        }
    }
}

#[test]
fn no_branch_is_used_after_its_delete() {
    let plan = prepare_run_plan(&branching_history()).unwrap();
    let mut deleted: BTreeSet<BranchId> = BTreeSet::new();
    for action in &plan {
        let mentioned: Vec<BranchId> = match action {
            RunAction::Commit { branch, .. } => vec![*branch],
            RunAction::Fork { branches } | RunAction::Merge { branches } => branches.clone(),
            RunAction::Delete { branch } => {
                assert!(deleted.insert(*branch), "branch {branch} deleted twice");
                continue;
            }
        };
        for b in mentioned {
            assert!(!deleted.contains(&b), "branch {b} used after delete");
        }
    }
}

#[test]
fn per_branch_commit_order_is_topological() {
    let commits = branching_history();
    let plan = prepare_run_plan(&commits).unwrap();

    // Ancestry closure over the commit set.
    let by_hash: BTreeMap<CommitHash, &Commit> =
        commits.iter().map(|c| (c.hash, c)).collect();
    let is_ancestor = |ancestor: CommitHash, descendant: CommitHash| -> bool {
        let mut queue = vec![descendant];
        let mut visited = BTreeSet::new();
        while let Some(head) = queue.pop() {
            if head == ancestor && head != descendant {
                return true;
            }
            if !visited.insert(head) {
                continue;
            }
            if let Some(commit) = by_hash.get(&head) {
                queue.extend(commit.parents.iter().copied());
            }
        }
        false
    };

    let mut per_branch: BTreeMap<BranchId, Vec<CommitHash>> = BTreeMap::new();
    for action in &plan {
        if let RunAction::Commit { hash, branch } = action {
            per_branch.entry(*branch).or_default().push(*hash);
        }
    }
    for (branch, seen) in &per_branch {
        for i in 0..seen.len() {
            for j in (i + 1)..seen.len() {
                assert!(
                    !is_ancestor(seen[j], seen[i]),
                    "branch {branch}: {} runs before its ancestor {}",
                    seen[i],
                    seen[j]
                );
            }
        }
    }
}

#[test]
fn optimisation_is_idempotent_on_full_plans() {
    use strata_plan::optimize::optimize_plan;

    let plan = prepare_run_plan(&branching_history()).unwrap();
    assert_eq!(optimize_plan(plan.clone()), plan);
}

#[test]
fn merge_commit_replays_on_each_parent_branch_before_the_merge() {
    let plan = prepare_run_plan(&branching_history()).unwrap();
    // Find the first Merge and check the immediately preceding commits echo
    // the merge commit on the participating branches.
    let merge_at = plan
        .iter()
        .position(|a| matches!(a, RunAction::Merge { .. }))
        .unwrap();
    let RunAction::Merge { branches } = &plan[merge_at] else {
        unreachable!()
    };
    let echo: Vec<&RunAction> = plan[..merge_at]
        .iter()
        .rev()
        .take(branches.len())
        .collect();
    let mut echoed: BTreeSet<BranchId> = BTreeSet::new();
    let mut hashes: BTreeSet<CommitHash> = BTreeSet::new();
    for action in echo {
        let RunAction::Commit { hash, branch } = action else {
            panic!("expected commit echoes before the merge")
        };
        echoed.insert(*branch);
        hashes.insert(*hash);
    }
    assert_eq!(hashes.len(), 1, "echoes must target one merge commit");
    assert_eq!(echoed, branches.iter().copied().collect());
}
