pub mod error;
pub mod item;
pub mod items;
pub mod pipeline;
pub mod registry;
pub mod values;

pub use error::PipelineError;
pub use item::{
    fork_copy, is_merge_commit, ConfigurationOption, OneShotMergeProcessor, OptionValue,
    PipelineItem,
};
pub use pipeline::{Pipeline, DEPENDENCY_COMMIT, DEPENDENCY_INDEX};
pub use registry::ItemRegistry;
pub use values::{DepMap, FactMap};
