use serde::{Deserialize, Serialize};

use crate::id::CommitHash;

/// An immutable node in the ancestry graph. Parents keep the order the
/// source supplied them in; the committer timestamp is UTC milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub hash: CommitHash,
    pub parents: Vec<CommitHash>,
    pub committed_at_ms: u64,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
