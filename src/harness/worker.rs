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

use log::{debug, warn};
use std::any::Any;
use std::io::{self, BufRead, BufReader, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::error::HarnessError;
use super::sink::Sink;
use super::timer::{timed, Clock};
use super::types::{Bracket, Strategy, Timestamp, WorkerId, WorkerHandle};
use super::workload::{Workload, WorkloadSpec};

/// One strategy's way of starting a worker and waiting for it.
///
/// `spawn` returns an opaque running worker whose timestamps cannot be read;
/// only `join` turns it into a [`WorkerHandle`], after the underlying unit
/// has terminated. `join` never fails: a failed workload comes back as a
/// handle with `failure` set and both timestamps populated.
pub trait TimedWorker {
    type Running;

    fn strategy(&self) -> Strategy;

    fn spawn(&self, id: WorkerId, clock: &Clock, sink: &Sink)
        -> Result<Self::Running, HarnessError>;

    fn join(&self, running: Self::Running) -> WorkerHandle;
}

type ThreadOutcome = (Bracket, thread::Result<anyhow::Result<Option<String>>>);

/// Runs the workload on a dedicated OS thread
pub struct ThreadWorker {
    workload: Arc<dyn Workload>,
}

/// A thread that has been started but not joined
pub struct RunningThread {
    id: WorkerId,
    requested: Timestamp,
    clock: Clock,
    handle: JoinHandle<ThreadOutcome>,
}

impl ThreadWorker {
    pub fn new(workload: Arc<dyn Workload>) -> Self {
        ThreadWorker { workload }
    }
}

impl TimedWorker for ThreadWorker {
    type Running = RunningThread;

    fn strategy(&self) -> Strategy {
        Strategy::Threads
    }

    fn spawn(&self, id: WorkerId, clock: &Clock, sink: &Sink) -> Result<RunningThread, HarnessError> {
        let workload = Arc::clone(&self.workload);
        let sink = sink.clone();
        let thread_clock = *clock;
        let requested = clock.now();

        let handle = thread::Builder::new()
            .name(format!("worker-{id}"))
            .spawn(move || {
                // Timed from inside the thread so the start is when it actually runs
                timed(&thread_clock, || {
                    panic::catch_unwind(AssertUnwindSafe(|| workload.run(id, &sink)))
                })
            })
            .map_err(|source| HarnessError::SpawnFailure {
                index: id.index(),
                source,
            })?;

        debug!("spawned thread worker {id}");
        Ok(RunningThread {
            id,
            requested,
            clock: *clock,
            handle,
        })
    }

    fn join(&self, running: RunningThread) -> WorkerHandle {
        let RunningThread {
            id,
            requested,
            clock,
            handle,
        } = running;

        match handle.join() {
            Ok((span, Ok(Ok(result)))) => {
                debug!("joined thread worker {id} after {:.6}s", span.duration());
                WorkerHandle::succeeded(id, span, result)
            }
            Ok((span, Ok(Err(err)))) => {
                warn!("thread worker {id} failed: {err:#}");
                WorkerHandle::failed(id, span, format!("{err:#}"))
            }
            Ok((span, Err(payload))) => {
                let reason = panic_message(payload.as_ref());
                warn!("thread worker {id} panicked: {reason}");
                WorkerHandle::failed(id, span, format!("panicked: {reason}"))
            }
            Err(payload) => {
                // The thread died outside the timed section; bracket what we saw.
                let reason = panic_message(payload.as_ref());
                warn!("thread worker {id} died: {reason}");
                WorkerHandle::failed(id, Bracket::new(requested, clock.now()), reason)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

type CommandFactory = Box<dyn Fn(WorkerId) -> Command + Send + Sync>;

/// Runs each worker as a separate OS process.
///
/// Timestamps are taken in the parent: the start when the spawn call returns
/// and the end when the wait call returns. The child's own first and last
/// instructions are not observable from here.
pub struct ProcessWorker {
    command: CommandFactory,
}

/// A child process that has been started but not waited on
pub struct RunningProcess {
    id: WorkerId,
    start: Timestamp,
    clock: Clock,
    child: Child,
    stdout_relay: Option<JoinHandle<()>>,
    stderr_reader: Option<JoinHandle<String>>,
}

impl ProcessWorker {
    /// Build the command for each worker with `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(WorkerId) -> Command + Send + Sync + 'static,
    {
        ProcessWorker {
            command: Box::new(factory),
        }
    }

    /// Re-execute `program` as `program worker --index <i> <spec args>`
    pub fn with_program(program: PathBuf, spec: &WorkloadSpec) -> Self {
        let args = spec.to_args();
        Self::new(move |id| {
            let mut cmd = Command::new(&program);
            cmd.arg("worker")
                .arg("--index")
                .arg(id.to_string())
                .args(&args);
            cmd
        })
    }

    /// Re-execute the currently running binary
    pub fn reexec(spec: &WorkloadSpec) -> io::Result<Self> {
        Ok(Self::with_program(std::env::current_exe()?, spec))
    }
}

impl TimedWorker for ProcessWorker {
    type Running = RunningProcess;

    fn strategy(&self) -> Strategy {
        Strategy::Processes
    }

    fn spawn(&self, id: WorkerId, clock: &Clock, sink: &Sink) -> Result<RunningProcess, HarnessError> {
        let spawn_failure = |source: io::Error| HarnessError::SpawnFailure {
            index: id.index(),
            source,
        };

        let mut cmd = (self.command)(id);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(spawn_failure)?;
        let start = clock.now();
        debug!("spawned process worker {id} (pid {})", child.id());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let relays = spawn_stdout_relay(id, stdout, sink.clone()).and_then(|stdout_relay| {
            spawn_stderr_reader(id, stderr).map(|stderr_reader| (stdout_relay, stderr_reader))
        });

        match relays {
            Ok((stdout_relay, stderr_reader)) => Ok(RunningProcess {
                id,
                start,
                clock: *clock,
                child,
                stdout_relay,
                stderr_reader,
            }),
            Err(source) => {
                // Without a reader the child could block on a full pipe
                let _ = child.kill();
                let _ = child.wait();
                Err(spawn_failure(source))
            }
        }
    }

    fn join(&self, running: RunningProcess) -> WorkerHandle {
        let RunningProcess {
            id,
            start,
            clock,
            mut child,
            stdout_relay,
            stderr_reader,
        } = running;

        let status = child.wait();
        let span = Bracket::new(start, clock.now());

        if let Some(relay) = stdout_relay {
            if relay.join().is_err() {
                warn!("stdout relay for process worker {id} panicked");
            }
        }
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        match status {
            Ok(status) if status.success() => {
                debug!("joined process worker {id} after {:.6}s", span.duration());
                WorkerHandle::succeeded(id, span, status.code().map(|c| c.to_string()))
            }
            Ok(status) => {
                let detail = stderr.trim();
                let reason = if detail.is_empty() {
                    format!("process {status}")
                } else {
                    format!("process {status}: {detail}")
                };
                warn!("process worker {id} failed: {reason}");
                WorkerHandle::failed(id, span, reason)
            }
            Err(err) => {
                warn!("could not wait on process worker {id}: {err}");
                WorkerHandle::failed(id, span, format!("wait failed: {err}"))
            }
        }
    }
}

fn spawn_stdout_relay(
    id: WorkerId,
    stdout: Option<impl Read + Send + 'static>,
    sink: Sink,
) -> io::Result<Option<JoinHandle<()>>> {
    let Some(stdout) = stdout else {
        return Ok(None);
    };
    thread::Builder::new()
        .name(format!("worker-{id}-stdout"))
        .spawn(move || relay_lines(id, BufReader::new(stdout), &sink))
        .map(Some)
}

/// Copy whole lines from `reader` into `sink` until EOF.
///
/// Bytes that are not UTF-8 are replaced, not treated as the end of output.
/// The pipe is drained to EOF even after a read error so the child never
/// writes into a closed pipe.
fn relay_lines(id: WorkerId, mut reader: impl BufRead, sink: &Sink) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf);
                if let Err(err) = sink.write_line(&line) {
                    debug!("dropping output of process worker {id}: {err}");
                }
            }
            Err(err) => {
                debug!("discarding rest of process worker {id} output: {err}");
                if let Err(err) = io::copy(&mut reader, &mut io::sink()) {
                    warn!("could not drain output of process worker {id}: {err}");
                }
                return;
            }
        }
    }
}

fn spawn_stderr_reader(
    id: WorkerId,
    stderr: Option<impl Read + Send + 'static>,
) -> io::Result<Option<JoinHandle<String>>> {
    let Some(mut stderr) = stderr else {
        return Ok(None);
    };
    thread::Builder::new()
        .name(format!("worker-{id}-stderr"))
        .spawn(move || {
            let mut bytes = Vec::new();
            if let Err(err) = stderr.read_to_end(&mut bytes) {
                debug!("stderr of process worker {id} cut short: {err}");
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
        .map(Some)
}
