use std::collections::BTreeMap;

use strata_core::{Commit, CommitHash};

/// Forward adjacency of the commit graph, restricted to the supplied set.
#[derive(Debug, Clone, Default)]
pub struct CommitDag {
    pub commits: BTreeMap<CommitHash, Commit>,
    pub children: BTreeMap<CommitHash, Vec<CommitHash>>,
}

impl CommitDag {
    /// Build the raw DAG. Parents that are not part of the commit set are
    /// ignored, treating foreign ancestors as sinks. Children keep the order
    /// they were encountered in; nothing is sorted at this stage.
    pub fn build(commits: &[Commit]) -> Self {
        let mut by_hash: BTreeMap<CommitHash, Commit> = BTreeMap::new();
        for commit in commits {
            by_hash.insert(commit.hash, commit.clone());
        }
        let mut children: BTreeMap<CommitHash, Vec<CommitHash>> = BTreeMap::new();
        for commit in commits {
            children.entry(commit.hash).or_default();
            for parent in &commit.parents {
                if !by_hash.contains_key(parent) {
                    continue;
                }
                children.entry(*parent).or_default().push(commit.hash);
            }
        }
        Self {
            commits: by_hash,
            children,
        }
    }

    /// Parents of each commit, derived from the forward adjacency.
    pub fn parent_map(&self) -> BTreeMap<CommitHash, Vec<CommitHash>> {
        let mut parents: BTreeMap<CommitHash, Vec<CommitHash>> = BTreeMap::new();
        for (hash, kids) in &self.children {
            for child in kids {
                parents.entry(*child).or_default().push(*hash);
            }
        }
        parents
    }

    /// Number of parents of `hash` still wired up in the raw adjacency.
    /// Fast-forward pruning removes edges, so this can be smaller than the
    /// commit's own parent list.
    pub fn num_parents(&self, hash: &CommitHash) -> usize {
        let Some(commit) = self.commits.get(hash) else {
            return 0;
        };
        commit
            .parents
            .iter()
            .filter(|p| {
                self.children
                    .get(p)
                    .map_or(false, |kids| kids.contains(hash))
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: u8, parents: &[u8]) -> Commit {
        Commit {
            hash: CommitHash::from_bytes([hash; 20]),
            parents: parents
                .iter()
                .map(|p| CommitHash::from_bytes([*p; 20]))
                .collect(),
            committed_at_ms: 0,
        }
    }

    fn h(b: u8) -> CommitHash {
        CommitHash::from_bytes([b; 20])
    }

    #[test]
    fn builds_forward_adjacency() {
        let dag = CommitDag::build(&[commit(1, &[]), commit(2, &[1]), commit(3, &[1])]);
        assert_eq!(dag.children[&h(1)], vec![h(2), h(3)]);
        assert!(dag.children[&h(2)].is_empty());
        assert!(dag.children[&h(3)].is_empty());
    }

    #[test]
    fn foreign_parents_are_sinks() {
        let dag = CommitDag::build(&[commit(2, &[9]), commit(3, &[2])]);
        assert!(!dag.children.contains_key(&h(9)));
        assert_eq!(dag.children[&h(2)], vec![h(3)]);
        assert_eq!(dag.num_parents(&h(2)), 0);
        assert_eq!(dag.num_parents(&h(3)), 1);
    }

    #[test]
    fn every_commit_has_a_children_entry() {
        let dag = CommitDag::build(&[commit(1, &[]), commit(2, &[1])]);
        assert_eq!(dag.children.len(), 2);
    }

    #[test]
    fn parent_map_inverts_children() {
        let dag = CommitDag::build(&[commit(1, &[]), commit(2, &[1]), commit(4, &[1, 2])]);
        let parents = dag.parent_map();
        assert_eq!(parents[&h(4)], vec![h(1), h(2)]);
        assert_eq!(parents[&h(2)], vec![h(1)]);
        assert!(!parents.contains_key(&h(1)));
    }

    #[test]
    fn num_parents_observes_pruned_edges() {
        let mut dag = CommitDag::build(&[commit(1, &[]), commit(2, &[1]), commit(4, &[1, 2])]);
        assert_eq!(dag.num_parents(&h(4)), 2);
        dag.children.get_mut(&h(1)).unwrap().retain(|c| *c != h(4));
        assert_eq!(dag.num_parents(&h(4)), 1);
    }
}
