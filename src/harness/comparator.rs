use chrono::{DateTime, Local};
use log::info;

use super::align::{align, fastest_finish_in_shared_space, faster, AlignedTimeline};
use super::error::CohortError;
use super::runner::CohortRunner;
use super::types::{CohortResult, Strategy};
use super::worker::TimedWorker;

/// Duration and aligned timeline of one cohort
#[derive(Clone, Debug, PartialEq)]
pub struct CohortSummary {
    pub strategy: Strategy,
    /// Outer start-to-finish in seconds
    pub duration: f64,
    pub timeline: AlignedTimeline,
}

/// Everything a presenter needs about one comparison
#[derive(Clone, Debug)]
pub struct ComparisonReport {
    /// Wall-clock time the comparison began
    pub started_at: DateTime<Local>,
    pub cohort_size: usize,
    /// Cohort that ran first
    pub first: CohortSummary,
    /// Cohort that ran second
    pub second: CohortSummary,
    /// Strategy with the smaller duration. On a tie this is `first`, which
    /// callers should not read as a win.
    pub faster: Strategy,
    /// Shared-axis end of the faster cohort
    pub fastest_finish: f64,
}

impl ComparisonReport {
    pub fn from_cohorts(
        started_at: DateTime<Local>,
        cohort_size: usize,
        first: &CohortResult,
        second: &CohortResult,
    ) -> Self {
        let (first_timeline, second_timeline) = align(first, second);
        ComparisonReport {
            started_at,
            cohort_size,
            first: CohortSummary {
                strategy: first.strategy,
                duration: first.duration(),
                timeline: first_timeline,
            },
            second: CohortSummary {
                strategy: second.strategy,
                duration: second.duration(),
                timeline: second_timeline,
            },
            faster: faster(first, second).strategy,
            fastest_finish: fastest_finish_in_shared_space(first, second),
        }
    }

    pub fn summary(&self, strategy: Strategy) -> Option<&CohortSummary> {
        [&self.first, &self.second]
            .into_iter()
            .find(|s| s.strategy == strategy)
    }

    pub fn cohorts(&self) -> [&CohortSummary; 2] {
        [&self.first, &self.second]
    }

    fn slower_duration(&self) -> f64 {
        self.first.duration.max(self.second.duration)
    }

    fn faster_duration(&self) -> f64 {
        self.first.duration.min(self.second.duration)
    }

    /// How many seconds the faster cohort saved
    pub fn margin(&self) -> f64 {
        self.slower_duration() - self.faster_duration()
    }

    /// Slower duration over faster duration, if the faster one took any time
    pub fn speedup(&self) -> Option<f64> {
        let fastest = self.faster_duration();
        (fastest > 0.0).then(|| self.slower_duration() / fastest)
    }
}

/// Runs two cohorts one after the other and compares them
#[derive(Clone, Debug)]
pub struct Comparator {
    runner: CohortRunner,
}

impl Comparator {
    pub fn new(runner: CohortRunner) -> Self {
        Comparator { runner }
    }

    /// Run `first` to completion, then `second`, each with `cohort_size`
    /// workers. The cohorts never overlap.
    pub fn compare<A, B>(
        &self,
        first: &A,
        second: &B,
        cohort_size: usize,
    ) -> Result<ComparisonReport, CohortError>
    where
        A: TimedWorker,
        B: TimedWorker,
    {
        let started_at = Local::now();
        let a = self.runner.run(first, cohort_size)?;
        let b = self.runner.run(second, cohort_size)?;

        let report = ComparisonReport::from_cohorts(started_at, cohort_size, &a, &b);
        info!(
            "{} {:.6}s vs {} {:.6}s, {} faster",
            report.first.strategy,
            report.first.duration,
            report.second.strategy,
            report.second.duration,
            report.faster
        );
        Ok(report)
    }
}
