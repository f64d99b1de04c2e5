use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("dependency cycle detected among: [{0}]")]
    CycleDetected(String),
    #[error("plan integrity violation: {0}")]
    IntegrityViolation(String),
}
