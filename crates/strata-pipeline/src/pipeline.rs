use std::collections::BTreeMap;

use strata_core::{Commit, CommitHash, RepoHandle};
use strata_plan::toposort::Graph;
use strata_plan::{prepare_run_plan, BranchId, RunAction};

use crate::item::PipelineItem;
use crate::registry::ItemRegistry;
use crate::values::{DepMap, FactMap};
use crate::PipelineError;

/// Dependency key under which every Consume receives the commit object.
pub const DEPENDENCY_COMMIT: &str = "commit";
/// Dependency key under which every Consume receives the commit index.
pub const DEPENDENCY_INDEX: &str = "index";

/// Drives a dependency-ordered list of items through a run plan, forking
/// and merging their state as the plan branches and joins.
pub struct Pipeline {
    items: Vec<Box<dyn PipelineItem>>,
    facts: FactMap,
    repo: RepoHandle,
    initialized: bool,
}

impl Pipeline {
    pub fn new(repo: RepoHandle) -> Self {
        Self {
            items: Vec::new(),
            facts: FactMap::new(),
            repo,
            initialized: false,
        }
    }

    pub fn add_item(&mut self, item: Box<dyn PipelineItem>) {
        self.items.push(item);
        self.initialized = false;
    }

    pub fn add_from_registry(
        &mut self,
        registry: &ItemRegistry,
        name: &str,
    ) -> Result<(), PipelineError> {
        let item = registry.create(name)?;
        self.add_item(item);
        Ok(())
    }

    pub fn items(&self) -> &[Box<dyn PipelineItem>] {
        &self.items
    }

    pub fn facts(&self) -> &FactMap {
        &self.facts
    }

    /// Sort items so providers precede consumers, then configure and
    /// initialise each. Must run before `run`.
    pub fn initialize(&mut self, facts: FactMap) -> Result<(), PipelineError> {
        let items = std::mem::take(&mut self.items);
        self.items = resolve_dependencies(items)?;
        self.facts = facts;
        for item in &mut self.items {
            item.configure(&mut self.facts)?;
        }
        for item in &mut self.items {
            item.initialize(&self.repo)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Prepare the run plan for `commits` and execute it. Item state lives
    /// per branch; the minimum surviving branch's state is kept as the
    /// pipeline's own once the plan ends.
    pub fn run(&mut self, commits: &[Commit]) -> Result<(), PipelineError> {
        if !self.initialized {
            return Err(PipelineError::NotInitialized);
        }
        let plan = prepare_run_plan(commits)?;
        let by_hash: BTreeMap<CommitHash, &Commit> =
            commits.iter().map(|c| (c.hash, c)).collect();

        let mut branches: BTreeMap<BranchId, Vec<Box<dyn PipelineItem>>> = BTreeMap::new();
        branches.insert(BranchId::ROOT, std::mem::take(&mut self.items));

        let mut commit_index: usize = 0;
        let result = execute_plan(&plan, &by_hash, &mut branches, &mut commit_index);

        // Whatever happened, reclaim the master branch state so facts and
        // item results stay reachable.
        if let Some((_, items)) = branches.into_iter().next() {
            self.items = items;
        }
        result
    }
}

fn execute_plan(
    plan: &[RunAction],
    by_hash: &BTreeMap<CommitHash, &Commit>,
    branches: &mut BTreeMap<BranchId, Vec<Box<dyn PipelineItem>>>,
    commit_index: &mut usize,
) -> Result<(), PipelineError> {
    for (plan_index, action) in plan.iter().enumerate() {
        match action {
            RunAction::Commit { hash, branch } => {
                let commit = *by_hash.get(hash).ok_or_else(|| PipelineError::Integrity {
                    index: plan_index,
                    detail: format!("commit {hash} is not part of the run"),
                })?;
                let state = branches.get_mut(branch).ok_or_else(|| {
                    PipelineError::Integrity {
                        index: plan_index,
                        detail: format!("branch {branch} has no state"),
                    }
                })?;
                let mut deps = DepMap::new();
                deps.insert(DEPENDENCY_COMMIT, commit.clone());
                deps.insert(DEPENDENCY_INDEX, *commit_index);
                for item in state.iter_mut() {
                    let produced =
                        item.consume(&deps)
                            .map_err(|source| PipelineError::ItemConsume {
                                item: item.name().to_string(),
                                index: plan_index,
                                commit: *hash,
                                source: Box::new(source),
                            })?;
                    deps.extend(produced);
                }
                *commit_index += 1;
            }
            RunAction::Fork { branches: ids } => {
                if ids.len() < 2 {
                    return Err(PipelineError::Integrity {
                        index: plan_index,
                        detail: "fork with fewer than two branches".to_string(),
                    });
                }
                let origin = branches.get(&ids[0]).ok_or_else(|| PipelineError::Integrity {
                    index: plan_index,
                    detail: format!("fork source {} has no state", ids[0]),
                })?;
                let clones = clone_items(origin, ids.len() - 1);
                for (state, id) in clones.into_iter().zip(&ids[1..]) {
                    if branches.insert(*id, state).is_some() {
                        return Err(PipelineError::Integrity {
                            index: plan_index,
                            detail: format!("fork target {id} already exists"),
                        });
                    }
                }
            }
            RunAction::Merge { branches: ids } => {
                if ids.len() < 2 {
                    return Err(PipelineError::Integrity {
                        index: plan_index,
                        detail: "merge with fewer than two branches".to_string(),
                    });
                }
                let mut target =
                    branches.remove(&ids[0]).ok_or_else(|| PipelineError::Integrity {
                        index: plan_index,
                        detail: format!("merge target {} has no state", ids[0]),
                    })?;
                let mut siblings: Vec<(BranchId, Vec<Box<dyn PipelineItem>>)> = Vec::new();
                for id in &ids[1..] {
                    let state =
                        branches.remove(id).ok_or_else(|| PipelineError::Integrity {
                            index: plan_index,
                            detail: format!("merge participant {id} has no state"),
                        })?;
                    siblings.push((*id, state));
                }
                for (position, item) in target.iter_mut().enumerate() {
                    let buffer: Vec<&dyn PipelineItem> = siblings
                        .iter()
                        .map(|(_, state)| state[position].as_ref())
                        .collect();
                    item.merge(&buffer);
                }
                branches.insert(ids[0], target);
                // Participants stay alive until their Delete.
                for (id, state) in siblings {
                    branches.insert(id, state);
                }
            }
            RunAction::Delete { branch } => {
                if branches.remove(branch).is_none() {
                    return Err(PipelineError::Integrity {
                        index: plan_index,
                        detail: format!("delete of unknown branch {branch}"),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Fork every item `n` ways and regroup the clones into `n` parallel branch
/// states: `result[j][i]` is the j-th clone of item i.
fn clone_items(origin: &[Box<dyn PipelineItem>], n: usize) -> Vec<Vec<Box<dyn PipelineItem>>> {
    let mut clones: Vec<Vec<Box<dyn PipelineItem>>> =
        (0..n).map(|_| Vec::with_capacity(origin.len())).collect();
    for item in origin {
        for (j, fork) in item.fork(n).into_iter().enumerate().take(n) {
            clones[j].push(fork);
        }
    }
    clones
}

/// Order items so each one's requirements are provided by an earlier item.
/// The framework keys are always satisfied and need no provider.
fn resolve_dependencies(
    mut items: Vec<Box<dyn PipelineItem>>,
) -> Result<Vec<Box<dyn PipelineItem>>, PipelineError> {
    items.sort_by_key(|item| item.name());

    let mut providers: BTreeMap<&'static str, &'static str> = BTreeMap::new();
    for item in &items {
        for key in item.provides() {
            if let Some(first) = providers.insert(key, item.name()) {
                return Err(PipelineError::DuplicateProvider {
                    key: key.to_string(),
                    first: first.to_string(),
                    second: item.name().to_string(),
                });
            }
        }
    }

    let mut graph: Graph<String> = Graph::new();
    for item in &items {
        graph.add_node(item.name().to_string());
    }
    for item in &items {
        for key in item.requires() {
            if key == DEPENDENCY_COMMIT || key == DEPENDENCY_INDEX {
                continue;
            }
            let provider = providers.get(key).ok_or_else(|| {
                PipelineError::UnresolvedRequirement {
                    item: item.name().to_string(),
                    key: key.to_string(),
                }
            })?;
            graph.add_edge(provider.to_string(), item.name().to_string());
        }
    }
    let order = graph.toposort()?;
    let mut by_name: BTreeMap<String, Box<dyn PipelineItem>> = BTreeMap::new();
    for item in items {
        let name = item.name().to_string();
        if by_name.insert(name.clone(), item).is_some() {
            return Err(PipelineError::DuplicateItem(name));
        }
    }
    let mut sorted = Vec::with_capacity(by_name.len());
    for name in order {
        if let Some(item) = by_name.remove(&name) {
            sorted.push(item);
        }
    }
    Ok(sorted)
}
