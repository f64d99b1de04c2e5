use serde::{Deserialize, Serialize};
use std::fmt;

use strata_core::CommitHash;

/// Logical lane of per-item state. Unrelated to source-control branches;
/// ids are issued by the plan generator, 0 being the root lane.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BranchId(pub u32);

impl BranchId {
    pub const ROOT: BranchId = BranchId(0);
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.0)
    }
}

/// One step of a run plan.
///
/// - `Commit` applies a commit to the item state of one branch.
/// - `Fork` duplicates the state of the first branch into the rest, which
///   must not exist yet; the first branch survives unchanged.
/// - `Merge` combines the trailing branches into the first.
/// - `Delete` releases a branch's state at its last use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunAction {
    Commit { hash: CommitHash, branch: BranchId },
    Fork { branches: Vec<BranchId> },
    Merge { branches: Vec<BranchId> },
    Delete { branch: BranchId },
}

impl RunAction {
    /// The branch an action is "about": the target of a Commit or Delete,
    /// the surviving branch of a Fork or Merge.
    pub fn leading_branch(&self) -> BranchId {
        match self {
            RunAction::Commit { branch, .. } | RunAction::Delete { branch } => *branch,
            RunAction::Fork { branches } | RunAction::Merge { branches } => branches[0],
        }
    }
}
