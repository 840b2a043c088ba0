use super::cohort_at;
use crate::config::{CompareConfig, RunOrder};
use crate::harness::{
    CohortError, ComparisonReport, HarnessError, Strategy, WorkloadKind, WorkloadSpec,
};
use crate::ui::{
    command_for_key, graph_model, settle_comparison, ui, Effect, GraphView, RunStatus,
    TimelineLayout, UiCommand, UiState,
};
use chrono::Local;
use crossterm::event::KeyCode;
use parking_lot::Mutex;
use ratatui::{backend::TestBackend, Terminal};
use std::thread;

fn config() -> CompareConfig {
    CompareConfig {
        workers: 2,
        workload: WorkloadSpec::new(WorkloadKind::Noop),
        order: RunOrder::ThreadsFirst,
        interactive: true,
        quiet: false,
    }
}

fn sample_report() -> ComparisonReport {
    let threads = cohort_at(Strategy::Threads, (0.0, 2.0), &[(0.5, 1.5), (0.5, 2.0)]);
    let processes = cohort_at(Strategy::Processes, (3.0, 4.0), &[(3.25, 3.75), (3.25, 4.0)]);
    ComparisonReport::from_cohorts(Local::now(), 2, &threads, &processes)
}

fn render(status: &RunStatus, log_lines: &[String], ui_state: &UiState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal
        .draw(|f| ui(f, status, log_lines, &config(), ui_state))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol.as_str())
        .collect()
}

#[test]
fn test_ui_state_defaults() {
    let state = UiState::default();
    assert_eq!(state.graph, GraphView::Hidden);
    assert_eq!(state.layout, TimelineLayout::Shared);
    assert!(!state.show_help);
}

#[test]
fn test_ui_state_transitions() {
    let mut state = UiState::new();

    assert_eq!(state.apply(UiCommand::ToggleGraph, false), Effect::None);
    assert_eq!(state.graph, GraphView::Visible);
    state.apply(UiCommand::ToggleGraph, false);
    assert_eq!(state.graph, GraphView::Hidden);

    state.apply(UiCommand::ToggleLayout, false);
    assert_eq!(state.layout, TimelineLayout::Overlay);
    state.apply(UiCommand::ToggleLayout, true);
    assert_eq!(state.layout, TimelineLayout::Shared);

    state.apply(UiCommand::ToggleHelp, false);
    assert!(state.show_help);

    assert_eq!(state.apply(UiCommand::Compare, false), Effect::StartComparison);
    // A second comparison cannot start while one is running
    assert_eq!(state.apply(UiCommand::Compare, true), Effect::None);
    assert_eq!(state.apply(UiCommand::Quit, true), Effect::Quit);
}

#[test]
fn test_key_bindings() {
    assert_eq!(command_for_key(KeyCode::Char('c')), Some(UiCommand::Compare));
    assert_eq!(command_for_key(KeyCode::Enter), Some(UiCommand::Compare));
    assert_eq!(command_for_key(KeyCode::Char('g')), Some(UiCommand::ToggleGraph));
    assert_eq!(command_for_key(KeyCode::Char('o')), Some(UiCommand::ToggleLayout));
    assert_eq!(command_for_key(KeyCode::Char('h')), Some(UiCommand::ToggleHelp));
    assert_eq!(command_for_key(KeyCode::Char('q')), Some(UiCommand::Quit));
    assert_eq!(command_for_key(KeyCode::Esc), Some(UiCommand::Quit));
    assert_eq!(command_for_key(KeyCode::Char('x')), None);
}

#[test]
fn test_run_status_report() {
    assert!(RunStatus::Running.is_running());
    assert!(RunStatus::Idle.report().is_none());
    let finished = RunStatus::Finished(Box::new(sample_report()));
    assert!(!finished.is_running());
    assert_eq!(finished.report().unwrap().cohort_size, 2);
}

#[test]
fn test_graph_model_shared_layout() {
    let model = graph_model(&sample_report(), TimelineLayout::Shared);

    let labels: Vec<_> = model.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Thread 0", "Thread 1", "Process 0", "Process 1"]);
    assert_eq!(model.rows[2].strategy, Strategy::Processes);
    assert_eq!(model.rows[2].start, 3.25);
    assert_eq!(model.fastest_finish, 4.0);
    assert_eq!(model.domain_end, 4.0);
}

#[test]
fn test_graph_model_overlay_layout() {
    let model = graph_model(&sample_report(), TimelineLayout::Overlay);

    assert_eq!(model.rows[0].start, 0.5);
    assert_eq!(model.rows[2].start, 0.25);
    assert_eq!(model.rows[3].end, 1.0);
    // Processes took 1s, threads 2s
    assert_eq!(model.fastest_finish, 1.0);
    assert_eq!(model.domain_end, 2.0);
}

#[test]
fn test_render_idle() {
    let screen = render(&RunStatus::Idle, &[], &UiState::new());
    assert!(screen.contains("READY"));
    assert!(screen.contains("Press 'c' to compare"));
    assert!(screen.contains("Graph: OFF"));
}

#[test]
fn test_render_finished_with_graph_and_log() {
    let mut state = UiState::new();
    state.apply(UiCommand::ToggleGraph, false);
    let status = RunStatus::Finished(Box::new(sample_report()));
    let log_lines = vec!["worker 0: 4242".to_string()];

    let screen = render(&status, &log_lines, &state);

    assert!(screen.contains("COMPLETED"));
    assert!(screen.contains("Threads execution time: 2.000000 s"));
    assert!(screen.contains("Processes execution time: 1.000000 s"));
    assert!(screen.contains("Processes faster by 1.000000 s"));
    assert!(screen.contains("Graph: ON"));
    assert!(screen.contains("Thread 0"));
    assert!(screen.contains("Process 1"));
    assert!(screen.contains("worker 0: 4242"));
}

#[test]
fn test_render_failed_and_help() {
    let mut state = UiState::new();
    state.apply(UiCommand::ToggleHelp, false);
    let status = RunStatus::failed("Threads cohort failed");

    let screen = render(&status, &[], &state);

    assert!(screen.contains("FAILED"));
    assert!(screen.contains("Comparison failed: Threads cohort failed"));
    assert!(screen.contains("Help"));
    assert!(screen.contains("toggle the graph"));
}

#[test]
fn test_failed_outcome_keeps_partial_cohort() {
    let partial = cohort_at(Strategy::Processes, (0.0, 1.0), &[(0.0, 0.5), (0.0, 1.0)]);
    let err = CohortError::new(
        HarnessError::WorkloadFailure {
            index: 1,
            reason: "process exit status: 3".to_string(),
        },
        partial,
    );

    match RunStatus::from_outcome(Err(err.into())) {
        RunStatus::Failed { message, partial } => {
            assert!(message.starts_with("Processes cohort failed"));
            let partial = partial.expect("partial cohort kept");
            assert_eq!(partial.workers.len(), 2);
        }
        other => panic!("unexpected status: {other:?}"),
    }

    match RunStatus::from_outcome(Err(anyhow::anyhow!("no executable"))) {
        RunStatus::Failed { message, partial } => {
            assert_eq!(message, "no executable");
            assert!(partial.is_none());
        }
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn test_panicked_comparison_thread_is_a_failure() {
    let status = Mutex::new(RunStatus::Running);
    let handle = thread::spawn(|| panic!("comparison blew up"));

    settle_comparison(&status, handle.join());

    assert!(matches!(&*status.lock(), RunStatus::Failed { .. }));
}

#[test]
fn test_settled_thread_keeps_its_outcome() {
    let status = Mutex::new(RunStatus::Finished(Box::new(sample_report())));
    settle_comparison(&status, thread::spawn(|| ()).join());
    assert!(status.lock().report().is_some());

    // A status written before the panic is not overwritten
    let status = Mutex::new(RunStatus::failed("earlier error"));
    settle_comparison(&status, thread::spawn(|| panic!("late")).join());
    match &*status.lock() {
        RunStatus::Failed { message, .. } => assert_eq!(message, "earlier error"),
        other => panic!("unexpected status: {other:?}"),
    };
}
