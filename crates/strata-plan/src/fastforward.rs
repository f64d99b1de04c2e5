use std::collections::{BTreeMap, BTreeSet};

use strata_core::CommitHash;

use crate::{ChainDag, CommitDag};

/// Remove fast-forward merges: a direct edge from a super-node to a child
/// that is also reachable through another already-ordered path is redundant
/// and gets pruned, concatenating chains where the pruning leaves a linear
/// run. `order` is the forward topological order of the chain heads before
/// collapsing; pruned raw edges are removed from `dag` as well so that
/// parent enumeration stays consistent for plan generation.
pub fn collapse_fast_forwards(order: &[CommitHash], dag: &mut CommitDag, chains: &mut ChainDag) {
    let mut parents: BTreeMap<CommitHash, Vec<CommitHash>> = BTreeMap::new();
    for (key, kids) in &chains.children {
        for child in kids {
            parents.entry(*child).or_default().push(*key);
        }
    }

    let mut processed: BTreeSet<CommitHash> = BTreeSet::new();
    for key in order {
        let key = *key;
        processed.insert(key);
        loop {
            let Some(vals) = chains.children.get(&key) else {
                break;
            };
            if vals.len() < 2 {
                break;
            }
            let vals = vals.clone();

            let mut to_remove: BTreeSet<CommitHash> = BTreeSet::new();
            for child in &vals {
                let mut visited: BTreeSet<CommitHash> = BTreeSet::new();
                visited.insert(*child);
                let mut queue: Vec<CommitHash> = Vec::new();
                for parent in parents.get(child).cloned().unwrap_or_default() {
                    if parent != key {
                        visited.insert(parent);
                        queue.push(parent);
                    }
                }
                let immediate_parent = match queue.as_slice() {
                    [only] => Some(*only),
                    _ => None,
                };
                while let Some(head) = queue.pop() {
                    if processed.contains(&head) {
                        if head == key {
                            to_remove.insert(*child);
                            if let Some(ip) = immediate_parent {
                                if chains.children.get(&ip).map_or(0, |v| v.len()) == 1 {
                                    concatenate(chains, &mut parents, ip, *child);
                                }
                            }
                        }
                        break;
                    }
                    for parent in parents.get(&head).cloned().unwrap_or_default() {
                        if visited.insert(parent) {
                            queue.push(parent);
                        }
                    }
                }
            }

            if to_remove.is_empty() {
                break;
            }

            // The pruned direct edges originate at the current chain tail;
            // capture it before any concatenation moves the tail.
            let tail = chains.tail(&key);

            let new_vals: Vec<CommitHash> = vals
                .iter()
                .filter(|c| !to_remove.contains(c))
                .copied()
                .collect();
            let mut merged = false;
            if let [only_child] = new_vals.as_slice() {
                let only_child = *only_child;
                if parents.get(&only_child).map_or(0, |p| p.len()) == 1 {
                    merged = true;
                    concatenate(chains, &mut parents, key, only_child);
                }
            }
            if !merged {
                chains.children.insert(key, new_vals);
            }
            if let Some(tail) = tail {
                if let Some(kids) = dag.children.get_mut(&tail) {
                    kids.retain(|c| !to_remove.contains(c));
                }
            }
            if !merged {
                break;
            }
        }
    }
}

/// Splice the chain headed by `child` onto the end of the chain headed by
/// `keep`, rewiring the parent map so `child`'s former children now see
/// `keep` as their parent.
fn concatenate(
    chains: &mut ChainDag,
    parents: &mut BTreeMap<CommitHash, Vec<CommitHash>>,
    keep: CommitHash,
    child: CommitHash,
) {
    let child_seq = chains.seq.remove(&child).unwrap_or_default();
    chains.seq.entry(keep).or_default().extend(child_seq);
    let child_children = chains.children.remove(&child).unwrap_or_default();
    chains.children.insert(keep, child_children);
    let keep_parents = parents.get(&keep).cloned().unwrap_or_default();
    parents.insert(child, keep_parents);
    for list in parents.values_mut() {
        if let Some(slot) = list.iter_mut().find(|v| **v == child) {
            *slot = keep;
        }
    }
}
