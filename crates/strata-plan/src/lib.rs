pub mod action;
pub mod chain;
pub mod component;
pub mod dag;
pub mod error;
pub mod fastforward;
pub mod generate;
pub mod optimize;
pub mod planner;
pub mod toposort;

pub use action::{BranchId, RunAction};
pub use chain::ChainDag;
pub use dag::CommitDag;
pub use error::PlanError;
pub use planner::prepare_run_plan;
