pub mod days_since_start;

pub use days_since_start::{DaysSinceStart, CommitsByDay, DEPENDENCY_DAY, FACT_COMMITS_BY_DAY};
