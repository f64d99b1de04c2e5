use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use strata_core::{Commit, CommitHash, RepoHandle};

use crate::item::{fork_copy, PipelineItem};
use crate::pipeline::{DEPENDENCY_COMMIT, DEPENDENCY_INDEX};
use crate::values::{DepMap, FactMap};
use crate::PipelineError;

/// Number of days since the first commit of the analysed sequence.
pub const DEPENDENCY_DAY: &str = "day";

/// Fact exposing the day index to commit hashes mapping.
pub const FACT_COMMITS_BY_DAY: &str = "DaysSinceStart.Commits";

/// Shared day -> commit hashes mapping, published through the fact map.
pub type CommitsByDay = Arc<Mutex<BTreeMap<i64, Vec<CommitHash>>>>;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
// 1990-01-01 UTC; committer clocks before this are almost certainly wrong.
const SUSPICIOUS_BEFORE_MS: i64 = 631_152_000_000;

/// Relative date information for every commit.
///
/// The first consumed commit pins day zero; later commits report whole days
/// elapsed since then, clamped so the sequence never decreases even when a
/// rebase reordered the committer timestamps. The per-branch clamp state is
/// copied at forks while the published day mapping is shared across all
/// branches.
#[derive(Clone, Default)]
pub struct DaysSinceStart {
    remote: String,
    day0_ms: Option<i64>,
    previous_day: i64,
    commits: CommitsByDay,
}

impl PipelineItem for DaysSinceStart {
    fn name(&self) -> &'static str {
        "DaysSinceStart"
    }

    fn provides(&self) -> Vec<&'static str> {
        vec![DEPENDENCY_DAY]
    }

    fn requires(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn configure(&mut self, facts: &mut FactMap) -> Result<(), PipelineError> {
        facts.insert(FACT_COMMITS_BY_DAY, Arc::clone(&self.commits));
        Ok(())
    }

    fn initialize(&mut self, repo: &RepoHandle) -> Result<(), PipelineError> {
        self.day0_ms = None;
        self.previous_day = 0;
        self.commits.lock().unwrap().clear();
        if let Some(url) = repo.origin_url() {
            self.remote = url.to_string();
        }
        Ok(())
    }

    fn consume(&mut self, deps: &DepMap) -> Result<DepMap, PipelineError> {
        let commit = deps
            .get::<Commit>(DEPENDENCY_COMMIT)
            .ok_or_else(|| PipelineError::MissingDependency(DEPENDENCY_COMMIT.to_string()))?;
        let index = deps
            .get::<usize>(DEPENDENCY_INDEX)
            .ok_or_else(|| PipelineError::MissingDependency(DEPENDENCY_INDEX.to_string()))?;

        let when_ms = commit.committed_at_ms as i64;
        if *index == 0 {
            let day0 = when_ms - when_ms.rem_euclid(MS_PER_DAY);
            self.day0_ms = Some(day0);
            if day0 < SUSPICIOUS_BEFORE_MS {
                tracing::warn!(
                    "suspicious committer timestamp in {} > {}",
                    self.remote,
                    commit.hash
                );
            }
        }
        let day0 = self
            .day0_ms
            .ok_or_else(|| PipelineError::Item("day zero was never established".to_string()))?;
        let mut day = (when_ms - day0) / MS_PER_DAY;
        if day < self.previous_day {
            // rebases rewrite history; the day sequence stays monotonous
            day = self.previous_day;
        }
        self.previous_day = day;

        let mut commits = self.commits.lock().unwrap();
        let day_commits = commits.entry(day).or_default();
        let exists =
            !commit.parents.is_empty() && day_commits.iter().any(|h| *h == commit.hash);
        if !exists {
            day_commits.push(commit.hash);
        }

        let mut produced = DepMap::new();
        produced.insert(DEPENDENCY_DAY, day);
        Ok(produced)
    }

    fn fork(&self, n: usize) -> Vec<Box<dyn PipelineItem>> {
        fork_copy(self, n)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
