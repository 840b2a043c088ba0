use log::{info, warn};

use super::error::{CohortError, HarnessError};
use super::sink::Sink;
use super::timer::Clock;
use super::types::{Bracket, CohortResult, WorkerId};
use super::worker::TimedWorker;

/// Spawns a cohort of workers under one strategy and collects their timings
#[derive(Clone, Debug)]
pub struct CohortRunner {
    clock: Clock,
    sink: Sink,
}

impl CohortRunner {
    pub fn new(clock: Clock, sink: Sink) -> Self {
        CohortRunner { clock, sink }
    }

    /// Spawn `cohort_size` workers back to back, then join them in spawn order.
    ///
    /// Spawning stops at the first spawn failure, but every worker already
    /// started is still joined before the error is returned. Workload failures
    /// do not stop siblings; the first one in spawn order is reported once all
    /// joins are done.
    pub fn run<W: TimedWorker>(
        &self,
        worker: &W,
        cohort_size: usize,
    ) -> Result<CohortResult, CohortError> {
        let strategy = worker.strategy();
        if cohort_size == 0 {
            return Ok(CohortResult::empty(strategy, self.clock.now()));
        }

        let outer_start = self.clock.now();

        let mut running = Vec::with_capacity(cohort_size.min(1024));
        let mut spawn_error = None;
        for index in 0..cohort_size {
            match worker.spawn(WorkerId(index), &self.clock, &self.sink) {
                Ok(r) => running.push(r),
                Err(err) => {
                    warn!("{strategy} cohort: {err}; joining {} started workers", running.len());
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        let workers = running.into_iter().map(|r| worker.join(r)).collect();

        let outer = Bracket::new(outer_start, self.clock.now());
        let result = CohortResult {
            strategy,
            outer,
            workers,
        };
        info!(
            "{strategy} cohort of {cohort_size} finished in {:.6}s",
            result.duration()
        );

        if let Some(err) = spawn_error {
            return Err(CohortError::new(err, result));
        }
        if let Some(failed) = result.first_failure() {
            let err = HarnessError::WorkloadFailure {
                index: failed.id.index(),
                reason: failed.failure.clone().unwrap_or_default(),
            };
            return Err(CohortError::new(err, result));
        }
        Ok(result)
    }
}
