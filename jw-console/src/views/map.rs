//! GIS view of the monitoring network.
//!
//! No tiles are fetched; a basemap here is metadata (name, attribution) plus
//! the render style applied to the built-in coastline map. The header counts
//! every fetched zone while only zones with parsable geometry plot, and the
//! panel discloses that gap as `plotted M/N`.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map as WorldMap, MapResolution},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use jw_model::{GeoPoint, MonitoringZone};

use crate::theme;

/// Default view center over the Bohai and Yellow Sea.
pub const CENTER_LAT: f64 = 37.5;
pub const CENTER_LON: f64 = 121.0;
const LAT_SPAN: f64 = 12.0;
const LON_SPAN: f64 = 18.0;

pub struct Basemap {
    pub key: &'static str,
    pub name: &'static str,
    pub attribution: &'static str,
    water: Color,
    land: Color,
    marker: Color,
}

pub const BASEMAPS: [Basemap; 3] = [
    Basemap {
        key: "osm",
        name: "OpenStreetMap",
        attribution: "(c) OpenStreetMap contributors",
        water: Color::Rgb(0x1a, 0x2b, 0x3c),
        land: Color::Rgb(0x8a, 0xb4, 0x6b),
        marker: Color::Rgb(0xff, 0x4d, 0x4f),
    },
    Basemap {
        key: "dark",
        name: "CARTO Dark Matter",
        attribution: "(c) OpenStreetMap contributors, (c) CARTO",
        water: Color::Rgb(0x0a, 0x0a, 0x0a),
        land: Color::Rgb(0x4a, 0x4a, 0x4a),
        marker: Color::Rgb(0xfa, 0xad, 0x14),
    },
    Basemap {
        key: "satellite",
        name: "Esri World Imagery",
        attribution: "Tiles (c) Esri - Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, GIS User Community",
        water: Color::Rgb(0x04, 0x1c, 0x30),
        land: Color::Rgb(0x2d, 0x4a, 0x2d),
        marker: Color::Rgb(0x13, 0xc2, 0xc2),
    },
];

pub fn basemap_by_key(key: &str) -> Option<&'static Basemap> {
    BASEMAPS.iter().find(|b| b.key == key)
}

#[derive(Default)]
pub struct MapView {
    zones: Vec<MonitoringZone>,
    loading: bool,
    selected: usize,
    basemap: usize,
}

impl MapView {
    pub fn reset(&mut self) {
        *self = MapView::default();
    }

    /// Entering the route: drop stale data and wait for the fetch.
    pub fn enter(&mut self) {
        self.reset();
        self.loading = true;
    }

    pub fn set_zones(&mut self, zones: Vec<MonitoringZone>) {
        self.zones = zones;
        self.loading = false;
        self.selected = 0;
    }

    pub fn fetch_failed(&mut self) {
        self.loading = false;
    }

    pub fn basemap(&self) -> &'static Basemap {
        &BASEMAPS[self.basemap]
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let plotted = self.plotted().len();
        match code {
            KeyCode::Char('b') => self.basemap = (self.basemap + 1) % BASEMAPS.len(),
            KeyCode::Down | KeyCode::Right if plotted > 0 => {
                self.selected = (self.selected + 1) % plotted;
            }
            KeyCode::Up | KeyCode::Left if plotted > 0 => {
                self.selected = (self.selected + plotted - 1) % plotted;
            }
            _ => {}
        }
    }

    /// Zones that carry a usable coordinate, in fetch order.
    pub(crate) fn plotted(&self) -> Vec<(&MonitoringZone, GeoPoint)> {
        self.zones
            .iter()
            .filter_map(|z| z.location().map(|p| (z, p)))
            .collect()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(40)])
            .split(area);

        self.render_chart(frame, columns[0]);
        self.render_panel(frame, columns[1]);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(
                " GIS Marine Monitoring Network   monitoring points: {} ",
                self.zones.len()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        if self.loading {
            let placeholder = Paragraph::new("\n  Loading chart data...")
                .style(Style::default().fg(theme::MUTED))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let basemap = self.basemap();
        let plotted = self.plotted();
        let selected = self.selected;
        let canvas = Canvas::default()
            .block(block)
            .background_color(basemap.water)
            .marker(symbols::Marker::Braille)
            .x_bounds([CENTER_LON - LON_SPAN / 2.0, CENTER_LON + LON_SPAN / 2.0])
            .y_bounds([CENTER_LAT - LAT_SPAN / 2.0, CENTER_LAT + LAT_SPAN / 2.0])
            .paint(|ctx| {
                ctx.draw(&WorldMap {
                    resolution: MapResolution::High,
                    color: basemap.land,
                });
                ctx.layer();
                for (i, (zone, point)) in plotted.iter().enumerate() {
                    let line = if i == selected {
                        Line::from(Span::styled(
                            format!("O {}", zone.name),
                            Style::default()
                                .fg(basemap.marker)
                                .add_modifier(Modifier::BOLD),
                        ))
                    } else {
                        Line::from(Span::styled("o", Style::default().fg(basemap.marker)))
                    };
                    ctx.print(point.lon, point.lat, line);
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Point details ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::MUTED));

        let plotted = self.plotted();
        let mut lines: Vec<Line> = Vec::new();
        match plotted.get(self.selected) {
            Some((zone, point)) => {
                lines.push(Line::from(Span::styled(
                    format!(" {}", zone.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(vec![
                    Span::styled(" Type  ", Style::default().fg(theme::MUTED)),
                    Span::styled(zone.zone_type.clone(), Style::default().fg(theme::ACCENT)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(" ID    ", Style::default().fg(theme::MUTED)),
                    Span::raw(zone.id.to_string()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(" Lat   ", Style::default().fg(theme::MUTED)),
                    Span::raw(format!("{:.4}", point.lat)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(" Lon   ", Style::default().fg(theme::MUTED)),
                    Span::raw(format!("{:.4}", point.lon)),
                ]));
            }
            None if self.loading => lines.push(Line::from(" Loading...")),
            None => lines.push(Line::from(Span::styled(
                " No plottable zones",
                Style::default().fg(theme::MUTED),
            ))),
        }

        lines.push(Line::from(""));
        let basemap = self.basemap();
        lines.push(Line::from(vec![
            Span::styled(" Basemap  ", Style::default().fg(theme::MUTED)),
            Span::styled(
                format!("{} [{}]", basemap.name, basemap.key),
                Style::default().fg(theme::ACCENT),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(" {}", basemap.attribution),
            Style::default().fg(theme::MUTED),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" plotted {}/{}", plotted.len(), self.zones.len()),
            Style::default().fg(theme::MUTED),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Up/Down select point   b basemap",
            Style::default().fg(theme::MUTED),
        )));

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: i64, geometry: Option<&str>) -> MonitoringZone {
        MonitoringZone {
            id,
            name: format!("Zone {id}"),
            zone_type: "Buoy".to_string(),
            geometry: geometry.map(str::to_string),
        }
    }

    #[test]
    fn registry_resolves_the_three_source_keys() {
        assert_eq!(basemap_by_key("osm").unwrap().name, "OpenStreetMap");
        assert_eq!(basemap_by_key("dark").unwrap().name, "CARTO Dark Matter");
        assert_eq!(basemap_by_key("satellite").unwrap().name, "Esri World Imagery");
        assert!(basemap_by_key("terrain").is_none());
    }

    #[test]
    fn basemap_cycling_wraps_around() {
        let mut view = MapView::default();
        assert_eq!(view.basemap().key, "osm");
        view.handle_key(KeyCode::Char('b'));
        assert_eq!(view.basemap().key, "dark");
        view.handle_key(KeyCode::Char('b'));
        assert_eq!(view.basemap().key, "satellite");
        view.handle_key(KeyCode::Char('b'));
        assert_eq!(view.basemap().key, "osm");
    }

    #[test]
    fn selection_cycles_only_plottable_zones() {
        let mut view = MapView::default();
        view.enter();
        view.set_zones(vec![
            zone(101, Some("POINT(119.5 38.2)")),
            zone(102, None),
            zone(103, Some("POINT(121.4 35.6)")),
        ]);

        assert_eq!(view.plotted().len(), 2, "one zone has no usable geometry");
        assert_eq!(view.plotted()[view.selected].0.id, 101);
        view.handle_key(KeyCode::Down);
        assert_eq!(view.plotted()[view.selected].0.id, 103);
        view.handle_key(KeyCode::Down);
        assert_eq!(view.plotted()[view.selected].0.id, 101, "wraps past the end");
    }

    #[test]
    fn entering_the_route_discards_previous_data() {
        let mut view = MapView::default();
        view.set_zones(vec![zone(101, Some("POINT(119.5 38.2)"))]);
        view.handle_key(KeyCode::Char('b'));
        view.enter();
        assert!(view.loading);
        assert!(view.zones.is_empty());
        assert_eq!(view.basemap().key, "osm");
    }
}
