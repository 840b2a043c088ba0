mod align_tests;
mod ui_tests;

use crate::harness::{Bracket, CohortResult, Strategy, Timestamp, WorkerHandle, WorkerId};

/// Build a cohort from absolute `(start, end)` seconds, outer bracket first
pub(crate) fn cohort_at(strategy: Strategy, outer: (f64, f64), workers: &[(f64, f64)]) -> CohortResult {
    let bracket = |(start, end): (f64, f64)| {
        Bracket::new(Timestamp::from_secs(start), Timestamp::from_secs(end))
    };
    CohortResult {
        strategy,
        outer: bracket(outer),
        workers: workers
            .iter()
            .enumerate()
            .map(|(i, span)| WorkerHandle::succeeded(WorkerId(i), bracket(*span), None))
            .collect(),
    }
}
