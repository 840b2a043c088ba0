//! Puts two cohorts measured at different times onto one time axis.
//!
//! Alignment only ever shifts: durations and ordering inside a cohort are
//! untouched.

use super::error::HarnessError;
use super::types::{CohortResult, Strategy, Timestamp, WorkerId};

/// Narrowest domain [`PlotScale::fitted`] will accept, in seconds
pub const MIN_DOMAIN_WIDTH: f64 = 1e-6;

/// A `[start, end]` pair in aligned seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignedSpan {
    pub start: f64,
    pub end: f64,
}

impl AlignedSpan {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn shifted(&self, by: f64) -> Self {
        AlignedSpan {
            start: self.start - by,
            end: self.end - by,
        }
    }
}

/// One worker on the aligned axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignedWorker {
    pub id: WorkerId,
    pub span: AlignedSpan,
}

/// A cohort re-expressed relative to a shared origin
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedTimeline {
    pub strategy: Strategy,
    pub outer: AlignedSpan,
    pub workers: Vec<AlignedWorker>,
}

impl AlignedTimeline {
    fn from_cohort(cohort: &CohortResult, base: Timestamp) -> Self {
        let span = |start: Timestamp, end: Timestamp| AlignedSpan {
            start: start.since(base),
            end: end.since(base),
        };
        AlignedTimeline {
            strategy: cohort.strategy,
            outer: span(cohort.outer.start, cohort.outer.end),
            workers: cohort
                .workers
                .iter()
                .map(|w| AlignedWorker {
                    id: w.id,
                    span: span(w.span.start, w.span.end),
                })
                .collect(),
        }
    }

    /// `(identity, start offset, end offset)` rows in spawn order
    pub fn triples(&self) -> Vec<(WorkerId, f64, f64)> {
        self.workers
            .iter()
            .map(|w| (w.id, w.span.start, w.span.end))
            .collect()
    }

    /// The same timeline moved so that its own outer start sits at zero
    pub fn anchored(&self) -> AlignedTimeline {
        let by = self.outer.start;
        AlignedTimeline {
            strategy: self.strategy,
            outer: self.outer.shifted(by),
            workers: self
                .workers
                .iter()
                .map(|w| AlignedWorker {
                    id: w.id,
                    span: w.span.shifted(by),
                })
                .collect(),
        }
    }

    /// Largest end offset of the cohort or any of its workers
    pub fn latest_end(&self) -> f64 {
        self.workers
            .iter()
            .map(|w| w.span.end)
            .fold(self.outer.end, f64::max)
    }
}

/// Shift both cohorts so the earlier outer start becomes zero
pub fn align(a: &CohortResult, b: &CohortResult) -> (AlignedTimeline, AlignedTimeline) {
    let base = a.outer.start.min(b.outer.start);
    (
        AlignedTimeline::from_cohort(a, base),
        AlignedTimeline::from_cohort(b, base),
    )
}

/// The cohort with the smaller duration; `a` on a tie
pub fn faster<'a>(a: &'a CohortResult, b: &'a CohortResult) -> &'a CohortResult {
    if b.duration() < a.duration() {
        b
    } else {
        a
    }
}

/// Shared-axis end instant of whichever cohort finished in less time
pub fn fastest_finish_in_shared_space(a: &CohortResult, b: &CohortResult) -> f64 {
    let base = a.outer.start.min(b.outer.start);
    faster(a, b).outer.end.since(base)
}

/// Linear interpolation of `value` from the domain onto the range.
///
/// The domain bounds map exactly onto the range bounds.
pub fn map_to_range(
    value: f64,
    domain_low: f64,
    domain_high: f64,
    range_low: f64,
    range_high: f64,
) -> Result<f64, HarnessError> {
    if domain_high == domain_low {
        return Err(HarnessError::DomainDegenerate {
            low: domain_low,
            high: domain_high,
        });
    }
    Ok(lerp(value, (domain_low, domain_high), (range_low, range_high)))
}

// Weighted form keeps both endpoints exact in floating point.
fn lerp(value: f64, (dl, dh): (f64, f64), (rl, rh): (f64, f64)) -> f64 {
    let t = (value - dl) / (dh - dl);
    rl * (1.0 - t) + rh * t
}

/// A validated domain-to-range mapping for plotting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl PlotScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, HarnessError> {
        // Validates the domain once so `map` cannot fail
        map_to_range(domain.0, domain.0, domain.1, range.0, range.1)?;
        Ok(PlotScale { domain, range })
    }

    /// Domain `[low, max(high, low + MIN_DOMAIN_WIDTH)]`
    pub fn fitted(low: f64, high: f64, range: (f64, f64)) -> Self {
        PlotScale {
            domain: (low, high.max(low + MIN_DOMAIN_WIDTH)),
            range,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        lerp(value, self.domain, self.range)
    }
}
