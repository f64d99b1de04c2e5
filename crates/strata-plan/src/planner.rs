use std::collections::BTreeMap;

use strata_core::{Commit, CommitHash};

use crate::chain::merge_chains;
use crate::fastforward::collapse_fast_forwards;
use crate::generate::generate_plan;
use crate::optimize::optimize_plan;
use crate::toposort::Graph;
use crate::{CommitDag, PlanError, RunAction};

/// Forward topological order of chain heads, nodes and edges pre-sorted by
/// hash so ties resolve lexicographically.
pub fn order_nodes(
    children: &BTreeMap<CommitHash, Vec<CommitHash>>,
) -> Result<Vec<CommitHash>, PlanError> {
    let mut graph = Graph::new();
    for key in children.keys() {
        graph.add_node(*key);
    }
    for (key, kids) in children {
        let mut kids = kids.clone();
        kids.sort();
        for child in kids {
            graph.add_edge(*key, child);
        }
    }
    graph.toposort()
}

/// Schedule the actions for a pipeline run: build the commit DAG, isolate
/// the root component, collapse chains and fast-forwards, generate the plan
/// and optimise it.
pub fn prepare_run_plan(commits: &[Commit]) -> Result<Vec<RunAction>, PlanError> {
    if commits.is_empty() {
        return Ok(Vec::new());
    }
    let mut dag = CommitDag::build(commits);
    dag.retain_root_component();
    let mut chains = merge_chains(&dag);
    let order = order_nodes(&chains.children)?;
    collapse_fast_forwards(&order, &mut dag, &mut chains);
    let order = order_nodes(&chains.children)?;
    let plan = generate_plan(&dag, &chains, &order)?;
    Ok(optimize_plan(plan))
}
