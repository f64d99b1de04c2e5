use std::collections::{BTreeMap, BTreeSet};

use crate::{BranchId, RunAction};

/// Rewrite a plan to drop dead branches and release live ones at their last
/// use.
///
/// A branch with a single commit did no work of its own (a fast-forward
/// residue), so every action referring to it is filtered out. Every other
/// branch gets a `Delete` right after the last action mentioning it, except
/// the branch the final action leaves alive. Existing `Delete` actions are
/// stripped and recomputed, which makes the rewrite idempotent. If nothing
/// changes, the input plan is returned as-is.
pub fn optimize_plan(plan: Vec<RunAction>) -> Vec<RunAction> {
    let base: Vec<RunAction> = plan
        .iter()
        .filter(|a| !matches!(a, RunAction::Delete { .. }))
        .cloned()
        .collect();
    let Some(last_action) = base.last() else {
        return plan;
    };
    let survivor = last_action.leading_branch();

    // Census: commits per branch and the last plan index mentioning each
    // branch (commit target, fork source, or merge participant).
    let mut lives: BTreeMap<BranchId, usize> = BTreeMap::new();
    let mut last_mentioned: BTreeMap<BranchId, usize> = BTreeMap::new();
    for (i, action) in base.iter().enumerate() {
        match action {
            RunAction::Commit { branch, .. } => {
                *lives.entry(*branch).or_insert(0) += 1;
                last_mentioned.insert(*branch, i);
            }
            RunAction::Fork { branches } => {
                last_mentioned.insert(branches[0], i);
            }
            RunAction::Merge { branches } => {
                for b in branches {
                    last_mentioned.insert(*b, i);
                }
            }
            RunAction::Delete { .. } => {}
        }
    }

    let dead: BTreeSet<BranchId> = lives
        .iter()
        .filter(|(_, &count)| count == 1)
        .map(|(b, _)| *b)
        .collect();
    for b in &dead {
        last_mentioned.remove(b);
    }

    // Deletes keyed by the index they follow; BTreeMap ordering plus the
    // sorted id vectors give the stable (index, branch) emission order.
    let mut deletes_at: BTreeMap<usize, Vec<BranchId>> = BTreeMap::new();
    for (b, i) in &last_mentioned {
        if *i == base.len() - 1 && *b == survivor {
            continue;
        }
        deletes_at.entry(*i).or_default().push(*b);
    }
    for ids in deletes_at.values_mut() {
        ids.sort();
    }

    let had_deletes = base.len() != plan.len();
    if dead.is_empty() && deletes_at.is_empty() && !had_deletes {
        return plan;
    }

    let mut out: Vec<RunAction> = Vec::with_capacity(base.len() + last_mentioned.len());
    for (i, action) in base.iter().enumerate() {
        match action {
            RunAction::Commit { branch, .. } => {
                if !dead.contains(branch) {
                    out.push(action.clone());
                }
            }
            RunAction::Fork { branches } => {
                let kept: Vec<BranchId> = branches
                    .iter()
                    .filter(|b| !dead.contains(b))
                    .copied()
                    .collect();
                if kept.len() > 1 {
                    out.push(RunAction::Fork { branches: kept });
                }
            }
            RunAction::Merge { branches } => {
                let kept: Vec<BranchId> = branches
                    .iter()
                    .filter(|b| !dead.contains(b))
                    .copied()
                    .collect();
                if kept.len() > 1 {
                    out.push(RunAction::Merge { branches: kept });
                }
            }
            RunAction::Delete { .. } => {}
        }
        if let Some(ids) = deletes_at.get(&i) {
            for b in ids {
                out.push(RunAction::Delete { branch: *b });
            }
        }
    }

    // A plan reduced to nothing means the whole history was one commit;
    // keep the original rather than an empty schedule.
    if out.is_empty() {
        return plan;
    }
    out
}
