//! Ecological knowledge graph, simulated live on a canvas.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame,
};

use jw_graph::{label_placement, Camera, ForceLayout, NodeCategory, Point, FOCUS_ZOOM};
use jw_model::GraphData;

use crate::theme;

/// The simulation keeps stepping in the background of the render loop until
/// it has run this many iterations, then holds still.
const SETTLE_STEPS: u32 = 600;
const STEPS_PER_TICK: u32 = 6;
const VIEW_PADDING: f64 = 60.0;

#[derive(Default)]
pub struct GraphView {
    data: Option<GraphData>,
    layout: Option<ForceLayout>,
    camera: Camera,
    selected: usize,
    steps_run: u32,
    loading: bool,
}

impl GraphView {
    pub fn reset(&mut self) {
        *self = GraphView::default();
    }

    pub fn enter(&mut self) {
        self.reset();
        self.loading = true;
    }

    pub fn set_graph(&mut self, data: GraphData) {
        self.layout = Some(ForceLayout::new(&data));
        self.data = Some(data);
        self.camera = Camera::new();
        self.selected = 0;
        self.steps_run = 0;
        self.loading = false;
    }

    pub fn fetch_failed(&mut self) {
        self.loading = false;
    }

    /// Advance the force simulation a little each frame.
    pub fn tick(&mut self) {
        if let Some(layout) = &mut self.layout {
            if self.steps_run < SETTLE_STEPS {
                for _ in 0..STEPS_PER_TICK {
                    layout.step();
                }
                self.steps_run += STEPS_PER_TICK;
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let count = self.data.as_ref().map_or(0, |d| d.nodes.len());
        match code {
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') if count > 0 => {
                self.selected = (self.selected + 1) % count;
            }
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
            }
            KeyCode::Enter => self.focus_selected(),
            KeyCode::Esc | KeyCode::Char('r') => self.camera.reset(),
            _ => {}
        }
    }

    /// Zoom onto the selected node at wherever the simulation has it now.
    fn focus_selected(&mut self) {
        let (Some(data), Some(layout)) = (&self.data, &self.layout) else {
            return;
        };
        let Some(node) = data.nodes.get(self.selected) else {
            return;
        };
        if let Some(position) = layout.position(node.id) {
            self.camera.focus_on(position);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(36)])
            .split(area);

        self.render_canvas(frame, columns[0]);
        self.render_panel(frame, columns[1]);
    }

    fn render_canvas(&self, frame: &mut Frame, area: Rect) {
        let (node_count, link_count) = self
            .data
            .as_ref()
            .map_or((0, 0), |d| (d.nodes.len(), d.links.len()));
        let block = Block::default()
            .title(format!(
                " Ecological Knowledge Graph   {node_count} nodes, {link_count} relations "
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        let (Some(data), Some(layout)) = (&self.data, &self.layout) else {
            let text = if self.loading {
                "\n  Loading knowledge graph..."
            } else {
                "\n  No graph data"
            };
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(theme::MUTED)).block(block),
                area,
            );
            return;
        };
        let Some((min, max)) = layout.bounds() else {
            frame.render_widget(
                Paragraph::new("\n  Graph is empty")
                    .style(Style::default().fg(theme::MUTED))
                    .block(block),
                area,
            );
            return;
        };

        let half_w = ((max.x - min.x) / 2.0 + VIEW_PADDING) / self.camera.zoom;
        let half_h = ((max.y - min.y) / 2.0 + VIEW_PADDING) / self.camera.zoom;
        let center = if self.camera.zoom > 1.0 {
            self.camera.center
        } else {
            Point {
                x: (min.x + max.x) / 2.0,
                y: (min.y + max.y) / 2.0,
            }
        };
        let selected = self.selected;

        let canvas = Canvas::default()
            .block(block)
            .marker(symbols::Marker::Braille)
            .x_bounds([center.x - half_w, center.x + half_w])
            .y_bounds([center.y - half_h, center.y + half_h])
            .paint(|ctx| {
                for link in &data.links {
                    let (Some(from), Some(to)) =
                        (layout.position(link.source), layout.position(link.target))
                    else {
                        continue;
                    };
                    ctx.draw(&CanvasLine {
                        x1: from.x,
                        y1: from.y,
                        x2: to.x,
                        y2: to.y,
                        color: theme::MUTED,
                    });
                    // Direction marker near the target end.
                    let tip = Point {
                        x: from.x + (to.x - from.x) * 0.75,
                        y: from.y + (to.y - from.y) * 0.75,
                    };
                    ctx.print(
                        tip.x,
                        tip.y,
                        Line::from(Span::styled(
                            arrow_glyph(to.x - from.x, to.y - from.y).to_string(),
                            Style::default().fg(theme::MUTED),
                        )),
                    );
                    if let Some(placement) = label_placement(from, to) {
                        ctx.print(
                            placement.x,
                            placement.y,
                            Line::from(Span::styled(
                                link.relation.clone(),
                                Style::default().fg(theme::MUTED).add_modifier(Modifier::ITALIC),
                            )),
                        );
                    }
                }
                ctx.layer();
                for (i, node) in data.nodes.iter().enumerate() {
                    let Some(position) = layout.position(node.id) else {
                        continue;
                    };
                    let color = theme::category_color(NodeCategory::from_label(&node.label));
                    let style = if i == selected {
                        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                    } else {
                        Style::default().fg(color)
                    };
                    let dot = if i == selected { "O " } else { "o " };
                    ctx.print(
                        position.x,
                        position.y,
                        Line::from(vec![
                            Span::styled(dot, style),
                            Span::styled(node.name.clone(), style),
                        ]),
                    );
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Legend ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::MUTED));

        let mut lines: Vec<Line> = Vec::new();
        for category in NodeCategory::legend() {
            lines.push(Line::from(vec![
                Span::styled(
                    " * ",
                    Style::default().fg(theme::category_color(category)),
                ),
                Span::raw(category.display_name()),
            ]));
        }
        lines.push(Line::from(""));

        if let Some(node) = self
            .data
            .as_ref()
            .and_then(|d| d.nodes.get(self.selected))
        {
            let category = NodeCategory::from_label(&node.label);
            lines.push(Line::from(Span::styled(
                format!(" {}", node.name),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::styled(" Category  ", Style::default().fg(theme::MUTED)),
                Span::styled(
                    category.display_name(),
                    Style::default().fg(theme::category_color(category)),
                ),
            ]));
            for (key, value) in node.properties.iter().take(3) {
                lines.push(Line::from(Span::styled(
                    format!(" {key}: {value}"),
                    Style::default().fg(theme::MUTED),
                )));
            }
            lines.push(Line::from(""));
        }

        let view_line = if self.camera.zoom >= FOCUS_ZOOM {
            format!(" view  focused {:.0}x", self.camera.zoom)
        } else {
            " view  overview".to_string()
        };
        lines.push(Line::from(Span::styled(
            view_line,
            Style::default().fg(theme::MUTED),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Up/Down select   Enter focus",
            Style::default().fg(theme::MUTED),
        )));
        lines.push(Line::from(Span::styled(
            " Esc overview",
            Style::default().fg(theme::MUTED),
        )));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Arrowhead for the dominant axis of the edge. Canvas y points up.
fn arrow_glyph(dx: f64, dy: f64) -> char {
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            '>'
        } else {
            '<'
        }
    } else if dy > 0.0 {
        '^'
    } else {
        'v'
    }
}
