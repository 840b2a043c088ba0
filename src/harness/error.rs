use std::io;
use thiserror::Error;

use super::types::CohortResult;

/// Failures raised by the timing harness
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("workload failed on worker {index}: {reason}")]
    WorkloadFailure { index: usize, reason: String },

    #[error("could not start worker {index}: {source}")]
    SpawnFailure {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("degenerate domain [{low}, {high}]: bounds must differ")]
    DomainDegenerate { low: f64, high: f64 },
}

impl HarnessError {
    /// Index of the worker the failure refers to, if any
    pub fn worker_index(&self) -> Option<usize> {
        match self {
            HarnessError::WorkloadFailure { index, .. }
            | HarnessError::SpawnFailure { index, .. } => Some(*index),
            HarnessError::DomainDegenerate { .. } => None,
        }
    }
}

/// A cohort run that did not fully succeed.
///
/// Every worker that was spawned has been joined by the time this is
/// returned; `partial` holds what was measured.
#[derive(Error, Debug)]
#[error("{} cohort failed: {}", .partial.strategy, .source)]
pub struct CohortError {
    #[source]
    pub source: HarnessError,
    pub partial: Box<CohortResult>,
}

impl CohortError {
    pub fn new(source: HarnessError, partial: CohortResult) -> Self {
        CohortError {
            source,
            partial: Box::new(partial),
        }
    }
}
