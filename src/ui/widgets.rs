use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use super::app::{GraphView, RunStatus, TimelineLayout, UiState};
use crate::config::CompareConfig;
use crate::harness::{ComparisonReport, PlotScale, Strategy};

/// Canvas x units reserved for row labels
const LABEL_GUTTER: f64 = 16.0;
/// Canvas width in x units
const CANVAS_WIDTH: f64 = 100.0;

/// One bar on the timeline graph
#[derive(Clone, Debug, PartialEq)]
pub struct GraphRow {
    pub label: String,
    pub strategy: Strategy,
    pub start: f64,
    pub end: f64,
}

/// Everything needed to paint the timeline graph
#[derive(Clone, Debug, PartialEq)]
pub struct GraphModel {
    /// Thread rows first, then process rows, each in spawn order
    pub rows: Vec<GraphRow>,
    /// Where the faster cohort finished
    pub fastest_finish: f64,
    /// Right edge of the time axis
    pub domain_end: f64,
}

/// Lay out a report's timelines for drawing
pub fn graph_model(report: &ComparisonReport, layout: TimelineLayout) -> GraphModel {
    let mut rows = Vec::new();
    let mut domain_end = 0.0f64;

    for strategy in [Strategy::Threads, Strategy::Processes] {
        let Some(summary) = report.summary(strategy) else {
            continue;
        };
        let timeline = match layout {
            TimelineLayout::Shared => summary.timeline.clone(),
            TimelineLayout::Overlay => summary.timeline.anchored(),
        };
        domain_end = domain_end.max(timeline.latest_end());
        rows.extend(timeline.workers.iter().map(|w| GraphRow {
            label: format!("{} {}", strategy.worker_label(), w.id),
            strategy,
            start: w.span.start,
            end: w.span.end,
        }));
    }

    let fastest_finish = match layout {
        TimelineLayout::Shared => report.fastest_finish,
        // Anchored at zero, the faster cohort ends at its own duration
        TimelineLayout::Overlay => report.first.duration.min(report.second.duration),
    };

    GraphModel {
        rows,
        fastest_finish,
        domain_end: domain_end.max(fastest_finish),
    }
}

fn strategy_color(strategy: Strategy) -> Color {
    match strategy {
        Strategy::Threads => Color::Red,
        Strategy::Processes => Color::Blue,
    }
}

/// Main UI render function
pub fn ui<B: Backend>(
    f: &mut Frame<B>,
    status: &RunStatus,
    log_lines: &[String],
    config: &CompareConfig,
    ui_state: &UiState,
) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title and status
            Constraint::Length(3), // Controls
            Constraint::Length(6), // Results
            Constraint::Min(0),    // Graph and log
        ])
        .split(size);

    render_title(f, status, config, chunks[0]);
    render_controls(f, ui_state, chunks[1]);
    render_results(f, status, config, chunks[2]);

    match ui_state.graph {
        GraphView::Visible => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(chunks[3]);
            render_graph(f, status, ui_state.layout, body[0]);
            render_log(f, log_lines, body[1]);
        }
        GraphView::Hidden => render_log(f, log_lines, chunks[3]),
    }

    if ui_state.show_help {
        render_help(f, size);
    }
}

fn render_title<B: Backend>(f: &mut Frame<B>, status: &RunStatus, config: &CompareConfig, area: Rect) {
    let (state, color) = match status {
        RunStatus::Idle => ("READY", Color::White),
        RunStatus::Running => ("RUNNING", Color::Green),
        RunStatus::Finished(_) => ("COMPLETED", Color::Blue),
        RunStatus::Failed { .. } => ("FAILED", Color::Red),
    };
    let title = format!(
        "PARABENCH - {} threads vs {} processes - {state} (Press 'h' for help, 'q' to quit)",
        config.workers, config.workers
    );
    let paragraph = Paragraph::new(title.as_str())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_controls<B: Backend>(f: &mut Frame<B>, ui_state: &UiState, area: Rect) {
    let graph = match ui_state.graph {
        GraphView::Visible => "ON",
        GraphView::Hidden => "OFF",
    };
    let layout = match ui_state.layout {
        TimelineLayout::Shared => "shared",
        TimelineLayout::Overlay => "overlay",
    };
    let controls = format!(
        "Compare execution time ('c')   Graph: {graph} ('g')   Layout: {layout} ('o')"
    );
    let paragraph = Paragraph::new(controls.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(Span::styled("Controls", Style::default().fg(Color::Cyan)))
                .borders(Borders::ALL),
        );
    f.render_widget(paragraph, area);
}

fn render_results<B: Backend>(f: &mut Frame<B>, status: &RunStatus, config: &CompareConfig, area: Rect) {
    let (text, color) = match status {
        RunStatus::Idle => ("Press 'c' to compare execution time.".to_string(), Color::Gray),
        RunStatus::Running => {
            let [first, second] = config.order.strategies();
            (
                format!("Running {first} then {second} ({} workers each)...", config.workers),
                Color::Green,
            )
        }
        RunStatus::Finished(report) => {
            let mut lines: Vec<String> = report
                .cohorts()
                .iter()
                .map(|c| format!("{} execution time: {:.6} s", c.strategy, c.duration))
                .collect();
            if report.margin() > 0.0 {
                lines.push(format!(
                    "{} faster by {:.6} s",
                    report.faster,
                    report.margin()
                ));
            } else {
                lines.push("Both strategies took the same time".to_string());
            }
            (lines.join("\n"), Color::White)
        }
        RunStatus::Failed { message, .. } => (format!("Comparison failed: {message}"), Color::Red),
    };

    let paragraph = Paragraph::new(text.as_str())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .title(Span::styled("Results", Style::default().fg(Color::Yellow)))
                .borders(Borders::ALL),
        );
    f.render_widget(paragraph, area);
}

fn render_graph<B: Backend>(f: &mut Frame<B>, status: &RunStatus, layout: TimelineLayout, area: Rect) {
    let block = Block::default()
        .title(Span::styled("Graph", Style::default().fg(Color::Magenta)))
        .borders(Borders::ALL);

    let model = match status.report() {
        Some(report) => graph_model(report, layout),
        None => {
            let hint = Paragraph::new("No results yet.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(hint, area);
            return;
        }
    };
    if model.rows.is_empty() {
        let hint = Paragraph::new("Cohorts were empty.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let scale = PlotScale::fitted(0.0, model.domain_end, (LABEL_GUTTER, CANVAS_WIDTH - 1.0));
    let row_count = model.rows.len() as f64;

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, CANVAS_WIDTH])
        .y_bounds([0.0, row_count])
        .paint(|ctx| {
            for (i, row) in model.rows.iter().enumerate() {
                // Row 0 at the top
                let base = row_count - i as f64 - 1.0;
                let color = strategy_color(row.strategy);
                let (x1, x2) = (scale.map(row.start), scale.map(row.end));
                for step in 0..=4 {
                    let y = base + 0.15 + 0.7 * step as f64 / 4.0;
                    ctx.draw(&CanvasLine {
                        x1,
                        y1: y,
                        x2,
                        y2: y,
                        color,
                    });
                }
                ctx.print(
                    0.0,
                    base + 0.5,
                    Span::styled(row.label.clone(), Style::default().fg(color)),
                );
            }

            let x = scale.map(model.fastest_finish);
            let mut y = 0.0;
            while y < row_count {
                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: y,
                    x2: x,
                    y2: (y + 0.25).min(row_count),
                    color: Color::Green,
                });
                y += 0.4;
            }
        });

    f.render_widget(canvas, area);
}

fn render_log<B: Backend>(f: &mut Frame<B>, log_lines: &[String], area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = log_lines.len().saturating_sub(visible);
    let text = log_lines[start..].join("\n");

    let paragraph = Paragraph::new(text.as_str())
        .style(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .title(Span::styled("Worker output", Style::default().fg(Color::White)))
                .borders(Borders::ALL),
        );
    f.render_widget(paragraph, area);
}

/// Render the help overlay
fn render_help<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let help_area = centered_rect(50, 40, area);

    let help_block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(Color::White)))
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black).fg(Color::White));

    let help_text = [
        "Press 'c' or Enter to compare",
        "Press 'g' to toggle the graph",
        "Press 'o' to switch shared/overlay layout",
        "Press 'h' to toggle this help overlay",
        "Press 'q' to quit",
    ]
    .join("\n");

    let help_paragraph = Paragraph::new(help_text)
        .block(help_block)
        .style(
            Style::default()
                .bg(Color::Black)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);

    f.render_widget(Clear, help_area);
    f.render_widget(help_paragraph, help_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
