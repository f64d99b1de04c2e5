use std::collections::BTreeMap;

use strata_core::CommitHash;

use crate::{BranchId, ChainDag, CommitDag, PlanError, RunAction};

/// Walk the super-nodes in forward topological order, assigning branch ids
/// and emitting commit, fork and merge actions.
///
/// `branches` records the branch each chain head or tail is resident on;
/// `branchers` records, per child, the branch it inherits through a specific
/// parent edge when that parent forked.
pub fn generate_plan(
    dag: &CommitDag,
    chains: &ChainDag,
    order: &[CommitHash],
) -> Result<Vec<RunAction>, PlanError> {
    let mut plan: Vec<RunAction> = Vec::new();
    let mut branches: BTreeMap<CommitHash, BranchId> = BTreeMap::new();
    let mut branchers: BTreeMap<CommitHash, BTreeMap<CommitHash, BranchId>> = BTreeMap::new();
    let mut counter = 1u32;

    for (seq_index, head) in order.iter().enumerate() {
        if seq_index == 0 {
            branches.insert(*head, BranchId::ROOT);
        }
        let mut branch: Option<BranchId> = branches.get(head).copied();

        let seq = chains
            .seq
            .get(head)
            .ok_or_else(|| PlanError::IntegrityViolation(format!("no chain for head {head}")))?;

        for (i, hash) in seq.iter().enumerate() {
            if let Some(b) = branch {
                plan.push(RunAction::Commit { hash: *hash, branch: b });
            }
            if i == 0 && dag.num_parents(head) >= 2 {
                branch = emit_merge(dag, &branches, &branchers, &mut plan, *head, branch)?;
                branches.insert(*head, branch.ok_or_else(|| {
                    PlanError::IntegrityViolation(format!("merge of {head} resolved no branch"))
                })?);
            }
        }

        let tail = *seq.last().ok_or_else(|| {
            PlanError::IntegrityViolation(format!("empty chain for head {head}"))
        })?;
        if let Some(b) = branch {
            branches.insert(tail, b);
        }

        let children = chains.children.get(head).map(|c| c.as_slice()).unwrap_or(&[]);
        if children.len() > 1 {
            let b = branch.ok_or_else(|| {
                PlanError::IntegrityViolation(format!("fork from {head} with no branch"))
            })?;
            let mut fork_items = vec![b];
            for (i, child) in children.iter().enumerate() {
                if i == 0 {
                    branches.insert(*child, b);
                    continue;
                }
                let fresh = BranchId(counter);
                counter += 1;
                branches.entry(*child).or_insert(fresh);
                branchers.entry(*child).or_default().insert(tail, fresh);
                fork_items.push(fresh);
            }
            plan.push(RunAction::Fork { branches: fork_items });
        }
    }
    Ok(plan)
}

/// Emit the merge sequence after a merge commit: the commit is replayed on
/// every parent branch that differs from the current one, then a `Merge`
/// whose first id is the surviving branch. The survivor is the minimum
/// branch among single-child parents (fast-forward candidates) when one
/// exists, else the branch the commit already sits on.
fn emit_merge(
    dag: &CommitDag,
    branches: &BTreeMap<CommitHash, BranchId>,
    branchers: &BTreeMap<CommitHash, BTreeMap<CommitHash, BranchId>>,
    plan: &mut Vec<RunAction>,
    head: CommitHash,
    branch: Option<BranchId>,
) -> Result<Option<BranchId>, PlanError> {
    let commit = dag.commits.get(&head).ok_or_else(|| {
        PlanError::IntegrityViolation(format!("unknown merge commit {head}"))
    })?;

    let mut items: Vec<BranchId> = Vec::new();
    let mut min_branch: Option<BranchId> = None;
    for parent in &commit.parents {
        if !dag.commits.contains_key(parent) {
            continue;
        }
        let parent_branch = branchers
            .get(&head)
            .and_then(|m| m.get(parent))
            .copied()
            .or_else(|| branches.get(parent).copied())
            .ok_or_else(|| {
                PlanError::IntegrityViolation(format!(
                    "no branch recorded for parent {parent} of {head}"
                ))
            })?;
        if dag.children.get(parent).map_or(0, |k| k.len()) == 1
            && min_branch.map_or(true, |m| parent_branch < m)
        {
            min_branch = Some(parent_branch);
        }
        items.push(parent_branch);
        if Some(parent_branch) != branch {
            plan.push(RunAction::Commit { hash: head, branch: parent_branch });
        }
    }

    let survivor = match (min_branch, branch) {
        (Some(m), _) => m,
        (None, Some(b)) => b,
        (None, None) => {
            return Err(PlanError::IntegrityViolation(format!(
                "merge commit {head} has no surviving branch"
            )))
        }
    };
    let mut merge_items = vec![survivor];
    for item in items {
        if item != survivor && !merge_items.contains(&item) {
            merge_items.push(item);
        }
    }
    plan.push(RunAction::Merge { branches: merge_items });
    Ok(Some(survivor))
}
