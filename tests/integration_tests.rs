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

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn test_text_report_integration() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["-o", "text", "-n", "2", "-w", "noop"]);

    cmd.assert()
        .success()
        .stdout(contains("Summary:"))
        .stdout(contains("Workers:\t2 per cohort"))
        .stdout(contains("Threads:"))
        .stdout(contains("Processes:"))
        .stdout(contains("Faster:"))
        .stdout(contains("Thread 1\t"))
        .stdout(contains("Process 1\t"));
}

#[test]
fn test_processes_first_sleep_workload() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args([
        "-o",
        "text",
        "-n",
        "3",
        "-w",
        "sleep",
        "-z",
        "50ms",
        "--processes-first",
    ]);

    cmd.assert()
        .success()
        .stdout(contains("worker 2: slept 0.050s"))
        .stdout(contains("Fastest finish:"));
}

#[test]
fn test_process_output_is_relayed() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["-o", "text", "-n", "2", "-w", "random", "-i", "3"]);

    // Three lines per worker per cohort
    cmd.assert()
        .success()
        .stdout(contains("worker 1: ").count(6));
}

#[test]
fn test_quiet_discards_workload_output() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["-o", "text", "-n", "2", "-w", "random", "-i", "3", "-q"]);

    cmd.assert()
        .success()
        .stdout(contains("worker 0: ").not())
        .stdout(contains("Summary:"));
}

#[test]
fn test_fail_on_exits_non_zero() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["-o", "text", "-n", "3", "-w", "noop", "--fail-on", "1"]);

    cmd.assert()
        .failure()
        .stdout(contains("Threads cohort did not complete:"))
        .stdout(contains("FAILED: injected failure on worker 1"))
        .stderr(contains("workload failed on worker 1"));
}

#[test]
fn test_worker_subcommand() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["worker", "--index", "0", "-w", "sleep", "-z", "10ms"]);

    cmd.assert()
        .success()
        .stdout(contains("worker 0: slept 0.010s"));
}

#[test]
fn test_worker_subcommand_failure() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["worker", "--index", "2", "-w", "noop", "--fail-on", "2"]);

    cmd.assert()
        .failure()
        .stderr(contains("injected failure on worker 2"));
}

#[test]
fn test_invalid_output_format() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.args(["-o", "json", "-w", "noop"]);

    cmd.assert()
        .failure()
        .stderr(contains("Invalid output format"));
}

#[test]
fn test_help_hides_worker_subcommand() {
    let mut cmd = Command::cargo_bin("parabench").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(contains("--processes-first"))
        .stdout(contains("Run a single worker").not());
}
