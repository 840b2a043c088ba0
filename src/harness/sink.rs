use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

enum Target {
    Stdout,
    Buffer {
        lines: VecDeque<String>,
        capacity: usize,
    },
    Discard,
}

/// Shared output for workload text.
///
/// Clones share one lock. Writes are whole lines only and the lock is held
/// for the entire line, so output from concurrent workers never interleaves
/// within a line.
#[derive(Clone)]
pub struct Sink {
    target: Arc<Mutex<Target>>,
}

impl Sink {
    fn with_target(target: Target) -> Self {
        Sink {
            target: Arc::new(Mutex::new(target)),
        }
    }

    /// Write lines to this process's standard output
    pub fn stdout() -> Self {
        Self::with_target(Target::Stdout)
    }

    /// Keep the most recent `capacity` lines in memory
    pub fn buffered(capacity: usize) -> Self {
        Self::with_target(Target::Buffer {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        })
    }

    /// Drop everything written
    pub fn discard() -> Self {
        Self::with_target(Target::Discard)
    }

    /// Append one complete line
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut target = self.target.lock();
        match &mut *target {
            Target::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}")?;
                out.flush()
            }
            Target::Buffer { lines, capacity } => {
                if *capacity == 0 {
                    return Ok(());
                }
                if lines.len() == *capacity {
                    lines.pop_front();
                }
                lines.push_back(line.to_string());
                Ok(())
            }
            Target::Discard => Ok(()),
        }
    }

    /// Snapshot of buffered lines, oldest first. Empty for other targets.
    pub fn lines(&self) -> Vec<String> {
        match &*self.target.lock() {
            Target::Buffer { lines, .. } => lines.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Forget buffered lines
    pub fn clear(&self) {
        if let Target::Buffer { lines, .. } = &mut *self.target.lock() {
            lines.clear();
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &*self.target.lock() {
            Target::Stdout => "stdout",
            Target::Buffer { .. } => "buffer",
            Target::Discard => "discard",
        };
        f.debug_struct("Sink").field("target", &kind).finish()
    }
}
