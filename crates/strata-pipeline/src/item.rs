use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

use strata_core::{Commit, CommitHash, RepoHandle};

use crate::values::{DepMap, FactMap};
use crate::PipelineError;

/// A pluggable analysis unit. The pipeline clones item state at forks and
/// combines it at merges, so an instance only ever sees the commits of the
/// branch it rides.
pub trait PipelineItem {
    /// Unique type name, used for registry lookup and dependency resolution.
    fn name(&self) -> &'static str;

    /// Keys this item inserts into the dependency map of downstream items.
    fn provides(&self) -> Vec<&'static str>;

    /// Keys this item expects in its dependency map, produced upstream.
    fn requires(&self) -> Vec<&'static str>;

    fn list_configuration_options(&self) -> Vec<ConfigurationOption> {
        Vec::new()
    }

    fn configure(&mut self, _facts: &mut FactMap) -> Result<(), PipelineError> {
        Ok(())
    }

    fn initialize(&mut self, _repo: &RepoHandle) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Process the next commit. The returned map is folded into the deps of
    /// the items that follow; its keys must match `provides`.
    fn consume(&mut self, deps: &DepMap) -> Result<DepMap, PipelineError>;

    /// Produce `n` clones of this item for new branches. Items choose value
    /// or shared semantics; `fork_copy` covers the plain value case.
    fn fork(&self, n: usize) -> Vec<Box<dyn PipelineItem>>;

    /// Combine sibling branch state into this instance. The default keeps
    /// this instance as-is, which suits stateless and shared-state items.
    fn merge(&mut self, _siblings: &[&dyn PipelineItem]) {}

    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn PipelineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineItem").field("name", &self.name()).finish()
    }
}

/// Clone an item `n` times by value.
pub fn fork_copy<T>(origin: &T, n: usize) -> Vec<Box<dyn PipelineItem>>
where
    T: PipelineItem + Clone + 'static,
{
    (0..n)
        .map(|_| Box::new(origin.clone()) as Box<dyn PipelineItem>)
        .collect()
}

/// True when the commit has more than one parent.
pub fn is_merge_commit(commit: &Commit) -> bool {
    commit.parents.len() > 1
}

/// Tracks merge commits so an item can consume each one exactly once, even
/// though the plan replays merge commits on every participating branch.
#[derive(Debug, Clone, Default)]
pub struct OneShotMergeProcessor {
    merges: BTreeSet<CommitHash>,
}

impl OneShotMergeProcessor {
    pub fn initialize(&mut self) {
        self.merges.clear();
    }

    /// True on regular commits, and on the first sighting of a merge commit.
    pub fn should_consume(&mut self, commit: &Commit) -> bool {
        if commit.parents.len() <= 1 {
            return true;
        }
        self.merges.insert(commit.hash)
    }
}

/// A changeable public property of an item, surfaced so the host can bind it
/// to its own configuration layer.
#[derive(Debug, Clone)]
pub struct ConfigurationOption {
    pub name: &'static str,
    pub description: &'static str,
    pub flag: &'static str,
    pub default: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}
