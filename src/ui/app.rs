use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::widgets::ui;
use crate::config::CompareConfig;
use crate::harness::{CohortError, CohortResult, ComparisonReport, Sink};
use crate::{print_partial_cohort, print_text_report, run_comparison};

/// Workload lines kept for the log panel
const LOG_CAPACITY: usize = 200;

/// Whether the timeline graph is on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphView {
    Hidden,
    Visible,
}

/// How the two cohorts are laid out on the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineLayout {
    /// Both cohorts on one axis from the earlier cohort's start
    Shared,
    /// Each cohort shifted to start at zero
    Overlay,
}

/// Discrete inputs to the UI state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Compare,
    ToggleGraph,
    ToggleLayout,
    ToggleHelp,
    Quit,
}

/// What the event loop must do after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    StartComparison,
    Quit,
}

/// Progress of the comparison shown in the results panel
#[derive(Clone, Debug)]
pub enum RunStatus {
    Idle,
    Running,
    Finished(Box<ComparisonReport>),
    Failed {
        message: String,
        /// What the failed cohort measured, if it got that far
        partial: Option<Box<CohortResult>>,
    },
}

impl RunStatus {
    pub fn failed(message: impl Into<String>) -> Self {
        RunStatus::Failed {
            message: message.into(),
            partial: None,
        }
    }

    /// Status for a finished comparison, keeping partial cohort data on failure
    pub fn from_outcome(outcome: Result<ComparisonReport>) -> Self {
        match outcome {
            Ok(report) => RunStatus::Finished(Box::new(report)),
            Err(err) => RunStatus::Failed {
                message: format!("{err:#}"),
                partial: err
                    .downcast_ref::<CohortError>()
                    .map(|cohort| cohort.partial.clone()),
            },
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            RunStatus::Finished(report) => Some(report),
            _ => None,
        }
    }
}

/// UI-specific state
#[derive(Clone, Debug)]
pub struct UiState {
    pub graph: GraphView,
    pub layout: TimelineLayout,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            graph: GraphView::Hidden,
            layout: TimelineLayout::Shared,
            show_help: false,
        }
    }

    /// Apply one command. `running` says whether a comparison is in flight.
    pub fn apply(&mut self, command: UiCommand, running: bool) -> Effect {
        match command {
            UiCommand::Compare if running => Effect::None,
            UiCommand::Compare => Effect::StartComparison,
            UiCommand::ToggleGraph => {
                self.graph = match self.graph {
                    GraphView::Hidden => GraphView::Visible,
                    GraphView::Visible => GraphView::Hidden,
                };
                Effect::None
            }
            UiCommand::ToggleLayout => {
                self.layout = match self.layout {
                    TimelineLayout::Shared => TimelineLayout::Overlay,
                    TimelineLayout::Overlay => TimelineLayout::Shared,
                };
                Effect::None
            }
            UiCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                Effect::None
            }
            UiCommand::Quit => Effect::Quit,
        }
    }
}

/// Record the end of the background comparison thread.
///
/// A thread that panicked never wrote its outcome, so a status still left at
/// `Running` becomes `Failed`.
pub fn settle_comparison(status: &Mutex<RunStatus>, joined: thread::Result<()>) {
    if joined.is_err() {
        let mut status = status.lock();
        if status.is_running() {
            *status = RunStatus::failed("comparison thread panicked");
        }
    }
}

/// Key bindings
pub fn command_for_key(code: KeyCode) -> Option<UiCommand> {
    match code {
        KeyCode::Char('c') | KeyCode::Enter => Some(UiCommand::Compare),
        KeyCode::Char('g') => Some(UiCommand::ToggleGraph),
        KeyCode::Char('o') => Some(UiCommand::ToggleLayout),
        KeyCode::Char('h') => Some(UiCommand::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(UiCommand::Quit),
        _ => None,
    }
}

/// The UI application
pub struct App {
    config: CompareConfig,
    status: Arc<Mutex<RunStatus>>,
    sink: Sink,
    ui_state: UiState,
    worker: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(config: CompareConfig) -> Self {
        let sink = if config.quiet {
            Sink::discard()
        } else {
            Sink::buffered(LOG_CAPACITY)
        };
        App {
            config,
            status: Arc::new(Mutex::new(RunStatus::Idle)),
            sink,
            ui_state: UiState::new(),
            worker: None,
        }
    }

    /// Run the comparison on a background thread so the UI keeps drawing
    fn start_comparison(&mut self) {
        *self.status.lock() = RunStatus::Running;
        self.sink.clear();

        let config = self.config.clone();
        let sink = self.sink.clone();
        let status = Arc::clone(&self.status);
        self.worker = Some(thread::spawn(move || {
            let outcome = RunStatus::from_outcome(run_comparison(&config, sink));
            *status.lock() = outcome;
        }));
    }

    /// Join the background thread once it has exited
    fn reap_finished(&mut self) {
        if self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            if let Some(worker) = self.worker.take() {
                settle_comparison(&self.status, worker.join());
            }
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        loop {
            self.reap_finished();
            {
                // Hold the lock only while drawing
                let status = self.status.lock();
                let log_lines = self.sink.lines();
                terminal.draw(|f| ui(f, &status, &log_lines, &self.config, &self.ui_state))?;
            }

            if !event::poll(tick_rate)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = command_for_key(key.code) else {
                continue;
            };

            let running = self.status.lock().is_running();
            match self.ui_state.apply(command, running) {
                Effect::None => {}
                Effect::StartComparison => self.start_comparison(),
                Effect::Quit => break,
            }
        }
        Ok(())
    }

    /// Run the UI
    pub fn run(&mut self) -> Result<()> {
        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let outcome = self.event_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        outcome?;

        // A running comparison cannot be cancelled; wait for it
        if let Some(worker) = self.worker.take() {
            if self.status.lock().is_running() {
                println!("Waiting for the running comparison to finish...");
            }
            settle_comparison(&self.status, worker.join());
        }

        // Show final report
        match &*self.status.lock() {
            RunStatus::Finished(report) => print_text_report(&mut io::stdout(), report)?,
            RunStatus::Failed { message, partial } => {
                if let Some(partial) = partial {
                    print_partial_cohort(&mut io::stdout(), partial)?;
                }
                println!("Comparison failed: {message}");
            }
            RunStatus::Idle | RunStatus::Running => {}
        }
        Ok(())
    }
}
