use thiserror::Error;

use strata_core::CommitHash;
use strata_plan::PlanError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("pipeline is not initialized")]
    NotInitialized,
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("duplicate item: {0}")]
    DuplicateItem(String),
    #[error("{key} is provided by both {first} and {second}")]
    DuplicateProvider {
        key: String,
        first: String,
        second: String,
    },
    #[error("item {item} requires {key} which no item provides")]
    UnresolvedRequirement { item: String, key: String },
    #[error("missing dependency: {0}")]
    MissingDependency(String),
    #[error("plan integrity violation at action {index}: {detail}")]
    Integrity { index: usize, detail: String },
    #[error("item {item} failed on commit {commit} at action {index}: {source}")]
    ItemConsume {
        item: String,
        index: usize,
        commit: CommitHash,
        source: Box<PipelineError>,
    },
    #[error("item error: {0}")]
    Item(String),
}
