//! Staged risk assessment backed by the prediction endpoint.

use crossterm::event::KeyCode;
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use jw_model::{WarningLevel, WarningResult};

use crate::theme;

const STEP_TITLES: [&str; 3] = ["Data sync", "Model inference", "Report"];
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Request surfaced to the app shell when the operator starts a run.
#[derive(Debug, PartialEq)]
pub enum AnalysisAction {
    Start,
}

#[derive(Default)]
enum AnalysisPhase {
    #[default]
    Idle,
    Running {
        step: usize,
    },
    Finished {
        result: WarningResult,
    },
}

#[derive(Default)]
pub struct AnalysisView {
    phase: AnalysisPhase,
    entities: u32,
    ticks: usize,
}

impl AnalysisView {
    pub fn reset(&mut self) {
        *self = AnalysisView::default();
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, AnalysisPhase::Running { .. })
    }

    /// A run in flight ignores input; a finished report dismisses back to the
    /// ready screen.
    pub fn handle_key(&mut self, code: KeyCode) -> Option<AnalysisAction> {
        match (&self.phase, code) {
            (AnalysisPhase::Idle, KeyCode::Enter | KeyCode::Char('s')) => {
                self.phase = AnalysisPhase::Running { step: 0 };
                Some(AnalysisAction::Start)
            }
            (AnalysisPhase::Finished { .. }, KeyCode::Enter | KeyCode::Esc) => {
                self.phase = AnalysisPhase::Idle;
                None
            }
            _ => None,
        }
    }

    pub fn step_reached(&mut self, step: usize) {
        if self.is_running() {
            self.phase = AnalysisPhase::Running { step };
        }
    }

    pub fn finish(&mut self, result: WarningResult) {
        self.phase = AnalysisPhase::Finished { result };
    }

    pub fn failed(&mut self) {
        self.phase = AnalysisPhase::Idle;
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if self.is_running() {
            // The traversal counter the inference stage displays.
            self.entities = rand::thread_rng().gen_range(0..1000);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(8)])
            .split(area);

        self.render_pipeline(frame, rows[0]);
        match &self.phase {
            AnalysisPhase::Idle => self.render_idle(frame, rows[1]),
            AnalysisPhase::Running { step } => self.render_running(frame, rows[1], *step),
            AnalysisPhase::Finished { result } => self.render_report(frame, rows[1], result),
        }
    }

    fn render_pipeline(&self, frame: &mut Frame, area: Rect) {
        let mut spans: Vec<Span> = Vec::new();
        for (i, title) in STEP_TITLES.iter().enumerate() {
            let (marker, style) = match &self.phase {
                AnalysisPhase::Finished { .. } => ("[x]", Style::default().fg(theme::OK)),
                AnalysisPhase::Running { step } if i < *step => {
                    ("[x]", Style::default().fg(theme::OK))
                }
                AnalysisPhase::Running { step } if i == *step => (
                    "[>]",
                    Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
                ),
                _ => ("[ ]", Style::default().fg(theme::MUTED)),
            };
            if i > 0 {
                spans.push(Span::styled("  --  ", Style::default().fg(theme::MUTED)));
            }
            spans.push(Span::styled(format!("{marker} {}. {title}", i + 1), style));
        }
        let bar = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Assessment pipeline "));
        frame.render_widget(bar, area);
    }

    fn render_idle(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  System ready",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("  Deep-Jellyfish inference model loaded."),
            Line::from(""),
            Line::from(Span::styled(
                "  Press Enter to start a full-area risk assessment.",
                Style::default().fg(theme::MUTED),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(analysis_block(Style::default().fg(theme::ACCENT))),
            area,
        );
    }

    fn render_running(&self, frame: &mut Frame, area: Rect, step: usize) {
        let spinner = SPINNER[self.ticks % SPINNER.len()];
        let mut lines = vec![Line::from("")];
        let status = |text: String| {
            Line::from(Span::styled(text, Style::default().fg(theme::ACCENT)))
        };
        match step {
            0 => lines.push(status(format!("  {spinner} Syncing latest zone observations..."))),
            1 => {
                lines.push(status(format!(
                    "  {spinner} Computing multidimensional features..."
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(
                        "    Traversing knowledge graph nodes ({} entities)...",
                        self.entities
                    ),
                    Style::default().fg(theme::MUTED),
                )));
            }
            _ => lines.push(status(format!("  {spinner} Compiling assessment report..."))),
        }
        frame.render_widget(
            Paragraph::new(lines).block(analysis_block(Style::default().fg(theme::ACCENT))),
            area,
        );
    }

    fn render_report(&self, frame: &mut Frame, area: Rect, result: &WarningResult) {
        let when = result.timestamp.format("%Y-%m-%d %H:%M:%S");
        let mut lines = vec![Line::from("")];
        if result.level.is_risk() {
            let tone = match result.level {
                WarningLevel::Red => theme::DANGER,
                _ => theme::WARN,
            };
            lines.push(Line::from(Span::styled(
                format!("  {} warning response triggered", result.level.as_str()),
                Style::default().fg(tone).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!("  {}", result.message)));
            lines.push(Line::from(""));
            lines.push(detail_row("Zone", result.zone_name.clone()));
            lines.push(detail_row(
                "Core driver",
                "Abnormal temperature rise (>25 C) with chlorophyll exceedance".to_string(),
            ));
            lines.push(detail_row(
                "Graph inference",
                "[High temperature] -promotes-> [Aurelia aurita] -causes-> [cold-source blockage]"
                    .to_string(),
            ));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Recommended response",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from("    Deploy interception nets at the affected intakes."));
            lines.push(Line::from("    Schedule secondary filtering within 24 hours."));
        } else {
            lines.push(Line::from(Span::styled(
                "  Marine ecology is currently safe",
                Style::default().fg(theme::OK).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!("  {}", result.message)));
            lines.push(Line::from(""));
            lines.push(detail_row("Zone", result.zone_name.clone()));
            lines.push(detail_row(
                "Indicators",
                "All monitored readings within normal thresholds".to_string(),
            ));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Report generated {when}   (Enter to dismiss)"),
            Style::default().fg(theme::MUTED),
        )));

        let border = if result.level.is_risk() {
            Style::default().fg(theme::DANGER)
        } else {
            Style::default().fg(theme::OK)
        };
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(analysis_block(border)),
            area,
        );
    }
}

fn analysis_block(border: Style) -> Block<'static> {
    Block::default()
        .title(" Intelligent Analysis ")
        .borders(Borders::ALL)
        .border_style(border)
}

fn detail_row(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {name:<16}"), Style::default().fg(theme::MUTED)),
        Span::raw(value),
    ])
}
