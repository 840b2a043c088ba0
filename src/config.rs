use anyhow::{bail, Result};
use log::warn;

use crate::args::Args;
use crate::harness::{Strategy, WorkloadSpec};

/// Which cohort runs first. The two never run at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOrder {
    ThreadsFirst,
    ProcessesFirst,
}

impl RunOrder {
    pub fn strategies(&self) -> [Strategy; 2] {
        match self {
            RunOrder::ThreadsFirst => [Strategy::Threads, Strategy::Processes],
            RunOrder::ProcessesFirst => [Strategy::Processes, Strategy::Threads],
        }
    }
}

/// Configuration for one comparison run
#[derive(Clone, Debug)]
pub struct CompareConfig {
    /// Workers per cohort
    pub workers: usize,

    /// Work done by each worker
    pub workload: WorkloadSpec,

    pub order: RunOrder,

    /// Whether to use the interactive UI
    pub interactive: bool,

    /// Whether workload output is discarded
    pub quiet: bool,
}

impl CompareConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let interactive = match args.output_format.to_lowercase().as_str() {
            "ui" => true,
            "text" => false,
            other => bail!("Invalid output format: {other}. Supported formats: ui, text"),
        };

        let workload = args.workload.to_spec()?;
        if let Some(index) = workload.fail_on {
            if index >= args.workers {
                warn!(
                    "--fail-on {index} is outside a cohort of {} workers; nothing will fail",
                    args.workers
                );
            }
        }

        Ok(CompareConfig {
            workers: args.workers,
            workload,
            order: if args.processes_first {
                RunOrder::ProcessesFirst
            } else {
                RunOrder::ThreadsFirst
            },
            interactive,
            quiet: args.quiet,
        })
    }
}
