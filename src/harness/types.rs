use std::fmt;

/// The two concurrency strategies being compared
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Workers are threads sharing this process's memory
    Threads,
    /// Workers are independent OS processes
    Processes,
}

impl Strategy {
    /// Singular label used when naming a single worker ("Thread 2")
    pub fn worker_label(&self) -> &'static str {
        match self {
            Strategy::Threads => "Thread",
            Strategy::Processes => "Process",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Threads => write!(f, "Threads"),
            Strategy::Processes => write!(f, "Processes"),
        }
    }
}

/// Spawn-order index of a worker within its cohort
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl WorkerId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seconds since the origin of the [`Clock`](super::Clock) that produced it.
///
/// Every timestamp compared against another must come from the same clock.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_secs(secs: f64) -> Self {
        Timestamp(secs)
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later)
    pub fn since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    pub fn min(self, other: Timestamp) -> Timestamp {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

/// A closed `[start, end]` interval
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Bracket {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Bracket { start, end }
    }

    /// A zero-width bracket at `at`
    pub fn instant(at: Timestamp) -> Self {
        Bracket { start: at, end: at }
    }

    /// Length of the interval in seconds
    pub fn duration(&self) -> f64 {
        self.end.since(self.start)
    }
}

/// A joined worker: its identity, timestamps and outcome.
///
/// Only ever constructed after the underlying thread or process has been
/// joined, so both timestamps are final.
#[derive(Clone, Debug)]
pub struct WorkerHandle {
    pub id: WorkerId,
    pub span: Bracket,
    /// Value returned by the workload, if any
    pub result: Option<String>,
    /// Why the workload failed, if it did
    pub failure: Option<String>,
}

impl WorkerHandle {
    pub fn succeeded(id: WorkerId, span: Bracket, result: Option<String>) -> Self {
        WorkerHandle {
            id,
            span,
            result,
            failure: None,
        }
    }

    pub fn failed(id: WorkerId, span: Bracket, reason: impl Into<String>) -> Self {
        WorkerHandle {
            id,
            span,
            result: None,
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Everything measured for one cohort
#[derive(Clone, Debug)]
pub struct CohortResult {
    pub strategy: Strategy,
    /// Runner's own bracket around the whole spawn+join sequence
    pub outer: Bracket,
    /// Joined workers in spawn order
    pub workers: Vec<WorkerHandle>,
}

impl CohortResult {
    /// Result of a zero-size cohort invoked at `at`
    pub fn empty(strategy: Strategy, at: Timestamp) -> Self {
        CohortResult {
            strategy,
            outer: Bracket::instant(at),
            workers: Vec::new(),
        }
    }

    /// Start-to-finish time of the cohort in seconds
    pub fn duration(&self) -> f64 {
        self.outer.duration()
    }

    pub fn first_failure(&self) -> Option<&WorkerHandle> {
        self.workers.iter().find(|w| w.is_failure())
    }

    pub fn earliest_worker_start(&self) -> Option<Timestamp> {
        self.workers.iter().map(|w| w.span.start).reduce(Timestamp::min)
    }

    pub fn latest_worker_end(&self) -> Option<Timestamp> {
        self.workers
            .iter()
            .map(|w| w.span.end)
            .reduce(|a, b| if b > a { b } else { a })
    }
}
