//! Monitoring cockpit: warning banner, stat tiles and the trend chart, all
//! rendered from the latest engine snapshot.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline},
    Frame,
};

use jw_model::{self, SensorReading, DENSITY_WARN_PER_M3, TEMPERATURE_WARN_C};
use jw_sync::DashboardSnapshot;

use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // zone selector
            Constraint::Length(3), // status banner
            Constraint::Length(5), // stat tiles
            Constraint::Min(8),    // trend chart
            Constraint::Length(4), // density sparkline
        ])
        .split(area);

    render_selector(frame, rows[0], snap);
    render_banner(frame, rows[1], snap);
    render_tiles(frame, rows[2], snap.latest.as_ref());
    render_trend(frame, rows[3], &snap.history);
    render_density(frame, rows[4], &snap.history);
}

fn render_selector(frame: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let zone = snap
        .selected_zone()
        .map(|z| format!("{} ({})", z.name, z.id))
        .unwrap_or_else(|| "none".to_string());
    let mut spans = vec![
        Span::styled("  Zone: ", Style::default().fg(theme::MUTED)),
        Span::styled("< ", Style::default().fg(theme::ACCENT)),
        Span::styled(zone, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" >", Style::default().fg(theme::ACCENT)),
        Span::styled(
            format!("   {} zones   cycles {}", snap.zones.len(), snap.cycles_applied),
            Style::default().fg(theme::MUTED),
        ),
    ];
    if snap.loading {
        spans.push(Span::styled("   refreshing...", Style::default().fg(theme::ACCENT)));
    }
    let block = Block::default()
        .title(" Monitoring Cockpit ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_banner(frame: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let (text, style) = match &snap.latest {
        Some(reading) if reading.temperature_alert() => (
            format!(
                " HIGH TEMPERATURE WARNING  water at {:.1} C exceeds the {:.1} C threshold, watch for bloom risk",
                reading.temperature, TEMPERATURE_WARN_C
            ),
            Style::default().fg(Color::White).bg(theme::DANGER).add_modifier(Modifier::BOLD),
        ),
        Some(_) => (
            " Environment normal  all physico-chemical indicators are within their normal ranges".to_string(),
            Style::default().fg(theme::OK),
        ),
        None => (
            " Waiting for the first reading of the selected zone".to_string(),
            Style::default().fg(theme::MUTED),
        ),
    };
    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(Paragraph::new(text).style(style).block(block), area);
}

fn render_tiles(frame: &mut Frame, area: Rect, latest: Option<&SensorReading>) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let temp_alert = latest.is_some_and(SensorReading::temperature_alert);
    let density_alert = latest.is_some_and(SensorReading::density_alert);
    render_stat(
        frame,
        tiles[0],
        "Temperature",
        latest.map(|r| r.temperature),
        "C",
        if temp_alert { theme::DANGER } else { theme::OK },
    );
    render_stat(
        frame,
        tiles[1],
        "Jellyfish density",
        latest.map(|r| r.jellyfish_density),
        "/m3",
        if density_alert { theme::DANGER } else { theme::ACCENT },
    );
    render_stat(
        frame,
        tiles[2],
        "Salinity",
        latest.map(|r| r.salinity),
        "PSU",
        theme::TEAL,
    );
    render_stat(
        frame,
        tiles[3],
        "Chlorophyll",
        latest.map(|r| r.chlorophyll),
        "ug/L",
        theme::GREEN,
    );
}

fn render_stat(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: Option<f64>,
    unit: &str,
    color: Color,
) {
    let value_text = match value {
        Some(v) => format!("{v:.2} {unit}"),
        None => "--".to_string(),
    };
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::MUTED));
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value_text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(body, area);
}

fn render_trend(frame: &mut Frame, area: Rect, history: &[SensorReading]) {
    let block = Block::default()
        .title(" Temperature trend ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::MUTED));

    if history.len() < 2 {
        let placeholder = Paragraph::new("  No history for this zone yet")
            .style(Style::default().fg(theme::MUTED))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut ordered = history.to_vec();
    jw_model::sort_chronological(&mut ordered);

    let temps: Vec<(f64, f64)> = ordered
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.temperature))
        .collect();
    let last_x = (ordered.len() - 1) as f64;
    let threshold = [(0.0, TEMPERATURE_WARN_C), (last_x, TEMPERATURE_WARN_C)];

    let (mut y_min, mut y_max) = (TEMPERATURE_WARN_C, TEMPERATURE_WARN_C);
    for r in &ordered {
        y_min = y_min.min(r.temperature);
        y_max = y_max.max(r.temperature);
    }
    y_min -= 1.0;
    y_max += 1.0;

    let datasets = vec![
        Dataset::default()
            .name("warn threshold")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MUTED))
            .data(&threshold),
        Dataset::default()
            .name("temperature C")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::DANGER))
            .data(&temps),
    ];

    let time_label = |r: &SensorReading| r.record_time.format("%m-%d %H:%M").to_string();
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, last_x])
                .labels(vec![
                    time_label(&ordered[0]),
                    time_label(&ordered[ordered.len() / 2]),
                    time_label(&ordered[ordered.len() - 1]),
                ])
                .style(Style::default().fg(theme::MUTED)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![format!("{y_min:.1}"), format!("{y_max:.1}")])
                .style(Style::default().fg(theme::MUTED)),
        );
    frame.render_widget(chart, area);
}

fn render_density(frame: &mut Frame, area: Rect, history: &[SensorReading]) {
    let mut ordered = history.to_vec();
    jw_model::sort_chronological(&mut ordered);

    let latest = ordered.last().map(|r| r.jellyfish_density);
    let title = match latest {
        Some(d) if d > DENSITY_WARN_PER_M3 => format!(" Jellyfish density {d:.1}/m3 HIGH "),
        Some(d) => format!(" Jellyfish density {d:.1}/m3 "),
        None => " Jellyfish density ".to_string(),
    };
    // One-decimal resolution survives the integer sparkline scale.
    let bars: Vec<u64> = ordered
        .iter()
        .map(|r| (r.jellyfish_density.max(0.0) * 10.0) as u64)
        .collect();

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::MUTED)),
        )
        .style(Style::default().fg(theme::ACCENT))
        .data(&bars);
    frame.render_widget(sparkline, area);
}
