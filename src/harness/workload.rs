use anyhow::{bail, Result};
use rand::Rng;
use std::time::Duration;

use super::sink::Sink;
use super::types::WorkerId;

/// A unit of work run by every worker of a cohort.
///
/// `Ok(Some(_))` carries an optional result value back to the joiner; an
/// `Err` marks that worker as failed without affecting its siblings.
pub trait Workload: Send + Sync {
    fn run(&self, id: WorkerId, sink: &Sink) -> Result<Option<String>>;
}

impl<F> Workload for F
where
    F: Fn(WorkerId, &Sink) -> Result<Option<String>> + Send + Sync,
{
    fn run(&self, id: WorkerId, sink: &Sink) -> Result<Option<String>> {
        self(id, sink)
    }
}

/// Built-in workloads
#[derive(Clone, Debug, PartialEq)]
pub enum WorkloadKind {
    /// Return immediately
    Noop,
    /// Sleep for a fixed duration
    Sleep(Duration),
    /// Sleep for a uniformly random duration within `[min, max]`
    RandomSleep { min: Duration, max: Duration },
    /// Print `count` random integers, one per line
    RandomIntegers { count: usize },
}

/// A built-in workload plus optional failure injection.
///
/// Because it can be turned back into command-line arguments, the same spec
/// runs unchanged inside a thread or in a re-executed child process.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadSpec {
    pub kind: WorkloadKind,
    /// Index of the worker that fails after doing its work
    pub fail_on: Option<usize>,
}

impl WorkloadSpec {
    pub fn new(kind: WorkloadKind) -> Self {
        WorkloadSpec {
            kind,
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    /// Arguments that make `parabench worker` rebuild this spec
    pub fn to_args(&self) -> Vec<String> {
        let name = match &self.kind {
            WorkloadKind::Noop => "noop",
            WorkloadKind::Sleep(_) => "sleep",
            WorkloadKind::RandomSleep { .. } => "random-sleep",
            WorkloadKind::RandomIntegers { .. } => "random",
        };
        let mut args = vec!["--workload".to_string(), name.to_string()];
        match &self.kind {
            WorkloadKind::Noop => {}
            WorkloadKind::Sleep(d) => {
                args.extend(["--sleep".to_string(), format_millis(*d)]);
            }
            WorkloadKind::RandomSleep { min, max } => {
                args.extend(["--sleep".to_string(), format_millis(*min)]);
                args.extend(["--max-sleep".to_string(), format_millis(*max)]);
            }
            WorkloadKind::RandomIntegers { count } => {
                args.extend(["--iterations".to_string(), count.to_string()]);
            }
        }
        if let Some(index) = self.fail_on {
            args.extend(["--fail-on".to_string(), index.to_string()]);
        }
        args
    }
}

fn format_millis(d: Duration) -> String {
    format!("{}ms", d.as_millis())
}

impl Workload for WorkloadSpec {
    fn run(&self, id: WorkerId, sink: &Sink) -> Result<Option<String>> {
        let result = match &self.kind {
            WorkloadKind::Noop => None,
            WorkloadKind::Sleep(d) => {
                std::thread::sleep(*d);
                sink.write_line(&format!("worker {id}: slept {:.3}s", d.as_secs_f64()))?;
                None
            }
            WorkloadKind::RandomSleep { min, max } => {
                let d = if max > min {
                    rand::thread_rng().gen_range(*min..=*max)
                } else {
                    *min
                };
                std::thread::sleep(d);
                sink.write_line(&format!("worker {id}: random delay of {:.3}s", d.as_secs_f64()))?;
                Some(format!("{:.3}", d.as_secs_f64()))
            }
            WorkloadKind::RandomIntegers { count } => {
                let mut rng = rand::thread_rng();
                let mut last = None;
                for _ in 0..*count {
                    let value: u32 = rng.gen_range(1..=999_999);
                    sink.write_line(&format!("worker {id}: {value}"))?;
                    last = Some(value);
                }
                last.map(|v| v.to_string())
            }
        };

        if self.fail_on == Some(id.index()) {
            bail!("injected failure on worker {id}");
        }
        Ok(result)
    }
}
