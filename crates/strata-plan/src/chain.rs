use std::collections::{BTreeMap, BTreeSet};

use strata_core::CommitHash;

use crate::CommitDag;

/// The commit DAG with maximal linear chains collapsed into super-nodes.
///
/// `seq` maps each chain head to the full chain in order, head first; every
/// commit belongs to exactly one chain. `children` maps each head to the raw
/// children of the chain's tail, sorted by hash.
#[derive(Debug, Clone, Default)]
pub struct ChainDag {
    pub seq: BTreeMap<CommitHash, Vec<CommitHash>>,
    pub children: BTreeMap<CommitHash, Vec<CommitHash>>,
}

impl ChainDag {
    pub fn tail(&self, head: &CommitHash) -> Option<CommitHash> {
        self.seq.get(head).and_then(|seq| seq.last().copied())
    }
}

/// Collapse maximal single-parent/single-child runs into super-nodes.
pub fn merge_chains(dag: &CommitDag) -> ChainDag {
    let parents = dag.parent_map();
    let mut chains = ChainDag::default();
    let mut visited: BTreeSet<CommitHash> = BTreeSet::new();

    for head in dag.children.keys() {
        if visited.contains(head) {
            continue;
        }
        // Walk backward to the earliest commit of the chain.
        let mut c = *head;
        loop {
            let next = parents.get(&c).map(|p| p.as_slice()).unwrap_or(&[]);
            if next.len() != 1 || dag.children.get(&next[0]).map_or(0, |k| k.len()) != 1 {
                break;
            }
            c = next[0];
        }
        let head = c;
        // Walk forward collecting the sequence.
        let mut seq = Vec::new();
        loop {
            visited.insert(c);
            seq.push(c);
            let kids = dag.children.get(&c).map(|k| k.as_slice()).unwrap_or(&[]);
            if kids.len() != 1 {
                break;
            }
            c = kids[0];
            if parents.get(&c).map_or(0, |p| p.len()) != 1 {
                break;
            }
        }
        let tail = *seq.last().unwrap_or(&head);
        let mut tail_children = dag.children.get(&tail).cloned().unwrap_or_default();
        tail_children.sort();
        chains.seq.insert(head, seq);
        chains.children.insert(head, tail_children);
    }
    chains
}
