use std::collections::BTreeSet;

use strata_core::CommitHash;

use crate::CommitDag;

impl CommitDag {
    /// Weakly-connected-component analysis: keep the largest component (first
    /// encountered wins ties) and drop everything else from both maps,
    /// warning once per dropped commit.
    pub fn retain_root_component(&mut self) {
        let mut visited: BTreeSet<CommitHash> = BTreeSet::new();
        let mut sets: Vec<Vec<CommitHash>> = Vec::new();
        for key in self.children.keys().copied().collect::<Vec<_>>() {
            if visited.contains(&key) {
                continue;
            }
            let mut set = Vec::new();
            let mut queue = vec![key];
            while let Some(head) = queue.pop() {
                if !visited.insert(head) {
                    continue;
                }
                set.push(head);
                if let Some(kids) = self.children.get(&head) {
                    for child in kids {
                        if !visited.contains(child) {
                            queue.push(*child);
                        }
                    }
                }
                if let Some(commit) = self.commits.get(&head) {
                    for parent in &commit.parents {
                        if !visited.contains(parent) && self.commits.contains_key(parent) {
                            queue.push(*parent);
                        }
                    }
                }
            }
            sets.push(set);
        }

        if sets.len() <= 1 {
            return;
        }
        let mut max_len = 0;
        let mut max_ind = 0;
        for (i, set) in sets.iter().enumerate() {
            if set.len() > max_len {
                max_len = set.len();
                max_ind = i;
            }
        }
        for (i, set) in sets.iter().enumerate() {
            if i == max_ind {
                continue;
            }
            for hash in set {
                tracing::warn!("dropped {} from the analysis - disjoint", hash);
                self.children.remove(hash);
                self.commits.remove(hash);
            }
        }
    }
}
