// parabench - Threads versus processes timing harness
//
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

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

use crate::harness::{WorkloadKind, WorkloadSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkloadName {
    /// Return immediately
    Noop,
    /// Sleep for --sleep
    Sleep,
    /// Sleep for a random time between --sleep and --max-sleep
    RandomSleep,
    /// Print --iterations random integers
    Random,
}

/// Options describing the work every worker performs.
#[derive(clap::Args, Clone, Debug)]
pub struct WorkloadArgs {
    /// Workload run by every worker.
    #[arg(short = 'w', long = "workload", value_enum, default_value = "random")]
    pub workload: WorkloadName,

    /// Sleep time for `sleep`, lower bound for `random-sleep`.
    /// Examples: "500ms", "2s", "1m".
    #[arg(short = 'z', long = "sleep", default_value = "1s")]
    pub sleep: String,

    /// Upper bound for `random-sleep`.
    #[arg(long = "max-sleep", default_value = "5s")]
    pub max_sleep: String,

    /// Number of random integers each worker prints for `random`.
    #[arg(short = 'i', long = "iterations", default_value = "900")]
    pub iterations: usize,

    /// Make the worker with this index fail after its work is done.
    #[arg(long = "fail-on")]
    pub fail_on: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Run a single worker. Used by the process strategy.
    #[command(hide = true)]
    Worker {
        /// Index of this worker within its cohort.
        #[arg(long)]
        index: usize,

        #[command(flatten)]
        workload: WorkloadArgs,
    },
}

#[derive(Parser, Clone, Debug)]
#[command(
    author,
    version,
    about = "Compare threads against OS processes running the same workload."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Number of workers in each cohort.
    #[arg(short = 'n', long = "workers", default_value = "4")]
    pub workers: usize,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Run the process cohort before the thread cohort.
    #[arg(long = "processes-first")]
    pub processes_first: bool,

    /// Discard workload output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Output format. 'ui' for interactive, 'text' for a printed report.
    #[arg(short = 'o', long = "output", default_value = "ui")]
    pub output_format: String,
}

/// Parses a duration string (e.g., "250ms", "10s", "5m", "1h").
/// A bare number is taken as seconds.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    if duration_str.is_empty() {
        return Err(anyhow!("Duration string cannot be empty."));
    }

    let (num_part, unit_millis) = if let Some(num) = duration_str.strip_suffix("ms") {
        (num, 1)
    } else if let Some(num) = duration_str.strip_suffix('s') {
        (num, 1_000)
    } else if let Some(num) = duration_str.strip_suffix('m') {
        (num, 60_000)
    } else if let Some(num) = duration_str.strip_suffix('h') {
        (num, 3_600_000)
    } else {
        (duration_str, 1_000)
    };

    if num_part.is_empty() {
        return Err(anyhow!("Duration is missing a number."));
    }
    let num = num_part
        .parse::<u64>()
        .map_err(|_| anyhow!("Invalid duration format: '{duration_str}'"))?;
    num.checked_mul(unit_millis)
        .map(Duration::from_millis)
        .ok_or_else(|| anyhow!("Duration '{duration_str}' is too large"))
}

impl WorkloadArgs {
    /// Validate the options into a runnable workload
    pub fn to_spec(&self) -> Result<WorkloadSpec> {
        let kind = match self.workload {
            WorkloadName::Noop => WorkloadKind::Noop,
            WorkloadName::Sleep => {
                WorkloadKind::Sleep(parse_duration(&self.sleep).context("Invalid --sleep")?)
            }
            WorkloadName::RandomSleep => {
                let min = parse_duration(&self.sleep).context("Invalid --sleep")?;
                let max = parse_duration(&self.max_sleep).context("Invalid --max-sleep")?;
                if max < min {
                    bail!("--max-sleep must not be shorter than --sleep");
                }
                WorkloadKind::RandomSleep { min, max }
            }
            WorkloadName::Random => WorkloadKind::RandomIntegers {
                count: self.iterations,
            },
        };
        Ok(WorkloadSpec {
            kind,
            fail_on: self.fail_on,
        })
    }
}
