//! parabench compares two ways of running the same work concurrently.
//!
//! It runs a cohort of threads and a cohort of OS processes, one after the
//! other, capturing every worker's start and end on one monotonic clock. The
//! two cohorts are then aligned onto a shared time axis and reported either
//! as text or in an interactive terminal UI.

// Copyright (c) 2025 Parabench Contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use anyhow::{Context, Result};
use hdrhistogram::Histogram;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod config;
pub mod harness;
pub mod ui;

#[cfg(test)]
pub mod tests;

pub use args::{parse_duration, Args, Command, WorkloadArgs, WorkloadName};
pub use config::{CompareConfig, RunOrder};

use harness::{
    AlignedTimeline, Clock, CohortError, CohortResult, CohortRunner, Comparator, ComparisonReport,
    ProcessWorker, Sink, ThreadWorker, WorkerId, Workload,
};
use ui::App;

/// Installs the stderr log subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second initialisation (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Runs both cohorts in the configured order with the built-in workload.
///
/// The process cohort re-executes the current binary, so this only works
/// from the `parabench` executable itself.
pub fn run_comparison(config: &CompareConfig, sink: Sink) -> Result<ComparisonReport> {
    let threads = ThreadWorker::new(Arc::new(config.workload.clone()));
    let processes = ProcessWorker::reexec(&config.workload)
        .context("Could not locate the parabench executable")?;
    let comparator = Comparator::new(CohortRunner::new(Clock::new(), sink));

    let report = match config.order {
        RunOrder::ThreadsFirst => comparator.compare(&threads, &processes, config.workers)?,
        RunOrder::ProcessesFirst => comparator.compare(&processes, &threads, config.workers)?,
    };
    Ok(report)
}

/// Runs one worker in this process, writing its output to stdout.
fn run_worker(index: usize, workload: &WorkloadArgs) -> Result<()> {
    let spec = workload.to_spec()?;
    spec.run(WorkerId(index), &Sink::stdout())?;
    Ok(())
}

fn histogram_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Fastest, median and slowest worker duration in seconds.
fn worker_distribution(timeline: &AlignedTimeline) -> io::Result<Option<(f64, f64, f64)>> {
    if timeline.workers.is_empty() {
        return Ok(None);
    }
    let mut histogram = Histogram::<u64>::new(3).map_err(histogram_error)?;
    for worker in &timeline.workers {
        // Microsecond resolution
        let micros = (worker.span.duration().max(0.0) * 1_000_000.0) as u64;
        histogram.record(micros).map_err(histogram_error)?;
    }
    let secs = |micros: u64| micros as f64 / 1_000_000.0;
    Ok(Some((
        secs(histogram.min()),
        secs(histogram.value_at_quantile(0.5)),
        secs(histogram.max()),
    )))
}

/// Prints the comparison as a plain-text report.
pub fn print_text_report<W: Write>(w: &mut W, report: &ComparisonReport) -> io::Result<()> {
    writeln!(w, "\nSummary:")?;
    writeln!(
        w,
        "  Started:\t{}",
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(w, "  Workers:\t{} per cohort", report.cohort_size)?;
    for cohort in report.cohorts() {
        writeln!(w, "  {}:\t{:.6} secs", cohort.strategy, cohort.duration)?;
    }
    if report.margin() > 0.0 {
        match report.speedup() {
            Some(ratio) => writeln!(
                w,
                "  Faster:\t{} by {:.6} secs ({ratio:.2}x)",
                report.faster,
                report.margin()
            )?,
            None => writeln!(w, "  Faster:\t{} by {:.6} secs", report.faster, report.margin())?,
        }
    } else {
        writeln!(w, "  Faster:\tTie")?;
    }

    writeln!(w, "\nTimeline (secs from shared origin):")?;
    for cohort in report.cohorts() {
        let label = cohort.strategy.worker_label();
        for (id, start, end) in cohort.timeline.triples() {
            writeln!(
                w,
                "  {label} {id}\t{start:.6} -> {end:.6}\t({:.6})",
                end - start
            )?;
        }
    }
    writeln!(w, "  Fastest finish:\t{:.6}", report.fastest_finish)?;

    writeln!(w, "\nWorker durations (fastest, median, slowest):")?;
    for cohort in report.cohorts() {
        match worker_distribution(&cohort.timeline)? {
            Some((fastest, median, slowest)) => writeln!(
                w,
                "  {}:\t{fastest:.6} secs, {median:.6} secs, {slowest:.6} secs",
                cohort.strategy
            )?,
            None => writeln!(w, "  {}:\tno workers", cohort.strategy)?,
        }
    }
    Ok(())
}

/// Prints what a failed cohort measured before the error is reported.
pub fn print_cohort_failure<W: Write>(w: &mut W, error: &CohortError) -> io::Result<()> {
    print_partial_cohort(w, &error.partial)
}

/// Prints every joined worker of an incomplete cohort with its outcome.
pub fn print_partial_cohort<W: Write>(w: &mut W, partial: &CohortResult) -> io::Result<()> {
    writeln!(w, "\n{} cohort did not complete:", partial.strategy)?;
    writeln!(w, "  Total:\t{:.6} secs", partial.duration())?;
    let label = partial.strategy.worker_label();
    for worker in &partial.workers {
        let status = match &worker.failure {
            Some(reason) => format!("FAILED: {reason}"),
            None => "ok".to_string(),
        };
        writeln!(
            w,
            "  {label} {}\t{:.6} secs\t{status}",
            worker.id,
            worker.span.duration()
        )?;
    }
    Ok(())
}

pub fn run(args: Args) -> Result<()> {
    if let Some(Command::Worker { index, workload }) = &args.command {
        return run_worker(*index, workload);
    }

    // Log lines would scribble over the UI's alternate screen
    if args.output_format.eq_ignore_ascii_case("ui") {
        init_logging("off");
    } else {
        init_logging("warn");
    }

    let config = CompareConfig::from_args(&args)?;

    if config.interactive {
        let mut app = App::new(config);
        app.run()?;
    } else {
        let sink = if config.quiet {
            Sink::discard()
        } else {
            Sink::stdout()
        };
        match run_comparison(&config, sink) {
            Ok(report) => print_text_report(&mut io::stdout(), &report)?,
            Err(err) => {
                if let Some(cohort) = err.downcast_ref::<CohortError>() {
                    print_cohort_failure(&mut io::stdout(), cohort)?;
                }
                return Err(err);
            }
        }
    }

    Ok(())
}
