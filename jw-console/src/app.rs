//! Application shell: routing, background fetches, and per-frame updates.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

use jw_client::{MonitorClient, Notice};
use jw_model::{GraphData, MonitoringZone, WarningResult};
use jw_sync::{SyncConfig, ZoneSyncHandle};

use crate::theme;
use crate::views::analysis::{AnalysisAction, AnalysisView};
use crate::views::dashboard;
use crate::views::graph::GraphView;
use crate::views::login::{LoginAction, LoginView};
use crate::views::map::MapView;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Login,
    Dashboard,
    Map,
    Graph,
    Analysis,
}

/// Completions from spawned work. Fetches carry the generation that started
/// them; anything from before the latest navigation is dropped on arrival.
enum AppEvent {
    LoginDone(Result<String, String>),
    ZonesLoaded(u64, Option<Vec<MonitoringZone>>),
    GraphLoaded(u64, Option<GraphData>),
    AnalysisStep(u64, usize),
    AnalysisDone(u64, WarningResult),
    AnalysisFailed(u64),
}

struct Toast {
    message: String,
    at: Instant,
}

pub struct App {
    client: MonitorClient,
    sync: ZoneSyncHandle,
    route: Route,
    login: LoginView,
    map: MapView,
    graph: GraphView,
    analysis: AnalysisView,
    toasts: Vec<Toast>,
    notices: mpsc::UnboundedReceiver<Notice>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    fetch_gen: u64,
    pub should_quit: bool,
}

impl App {
    /// A persisted session skips the login screen and goes straight to the
    /// live dashboard.
    pub fn new(client: MonitorClient, notices: mpsc::UnboundedReceiver<Notice>) -> App {
        let sync = ZoneSyncHandle::spawn(client.clone(), SyncConfig::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let route = if client.session().is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };
        let app = App {
            client,
            sync,
            route,
            login: LoginView::default(),
            map: MapView::default(),
            graph: GraphView::default(),
            analysis: AnalysisView::default(),
            toasts: Vec::new(),
            notices,
            events_tx,
            events_rx,
            fetch_gen: 0,
            should_quit: false,
        };
        if app.route == Route::Dashboard {
            app.sync.start();
        }
        app
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.route == Route::Login {
            match self.login.handle_key(key.code) {
                Some(LoginAction::Submit { username, password }) => {
                    self.spawn_login(username, password)
                }
                Some(LoginAction::Quit) => self.should_quit = true,
                None => {}
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('l') => {
                self.logout();
                return;
            }
            KeyCode::Char('1') => {
                self.navigate(Route::Dashboard);
                return;
            }
            KeyCode::Char('2') => {
                self.navigate(Route::Map);
                return;
            }
            KeyCode::Char('3') => {
                self.navigate(Route::Graph);
                return;
            }
            KeyCode::Char('4') => {
                self.navigate(Route::Analysis);
                return;
            }
            _ => {}
        }
        match self.route {
            Route::Dashboard => self.dashboard_key(key.code),
            Route::Map => self.map.handle_key(key.code),
            Route::Graph => self.graph.handle_key(key.code),
            Route::Analysis => {
                if let Some(AnalysisAction::Start) = self.analysis.handle_key(key.code) {
                    self.spawn_analysis();
                }
            }
            Route::Login => {}
        }
    }

    /// Left/Right steps the monitored zone through the zone list.
    fn dashboard_key(&mut self, code: KeyCode) {
        let snap = self.sync.snapshot();
        let Some(current) = snap.selected_zone_id() else {
            return;
        };
        let ids: Vec<i64> = snap.zones.iter().map(|z| z.id).collect();
        let Some(pos) = ids.iter().position(|&id| id == current) else {
            return;
        };
        let next = match code {
            KeyCode::Right | KeyCode::Down => (pos + 1) % ids.len(),
            KeyCode::Left | KeyCode::Up => (pos + ids.len() - 1) % ids.len(),
            _ => return,
        };
        self.sync.switch_zone(ids[next]);
    }

    fn navigate(&mut self, to: Route) {
        if to == self.route {
            return;
        }
        match self.route {
            Route::Dashboard => self.sync.stop(),
            Route::Map => self.map.reset(),
            Route::Graph => self.graph.reset(),
            Route::Analysis => self.analysis.reset(),
            Route::Login => {}
        }
        self.fetch_gen += 1;
        self.route = to;
        match to {
            Route::Dashboard => self.sync.start(),
            Route::Map => {
                self.map.enter();
                self.spawn_zones_fetch();
            }
            Route::Graph => {
                self.graph.enter();
                self.spawn_graph_fetch();
            }
            Route::Analysis | Route::Login => {}
        }
    }

    fn logout(&mut self) {
        self.sync.stop();
        if let Err(e) = self.client.logout() {
            self.toast(format!("Logout failed: {e:#}"));
        }
        self.to_login();
    }

    fn to_login(&mut self) {
        self.fetch_gen += 1;
        self.map.reset();
        self.graph.reset();
        self.analysis.reset();
        self.login.reset();
        self.route = Route::Login;
    }

    fn spawn_login(&self, username: String, password: String) {
        let client = self.client.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match client.login(&username, &password).await {
                Ok(session) => Ok(session.username),
                Err(e) => Err(format!("{e:#}")),
            };
            let _ = events.send(AppEvent::LoginDone(outcome));
        });
    }

    fn spawn_zones_fetch(&self) {
        let client = self.client.clone();
        let events = self.events_tx.clone();
        let gen = self.fetch_gen;
        tokio::spawn(async move {
            let zones = client.zones().await.ok();
            let _ = events.send(AppEvent::ZonesLoaded(gen, zones));
        });
    }

    fn spawn_graph_fetch(&self) {
        let client = self.client.clone();
        let events = self.events_tx.clone();
        let gen = self.fetch_gen;
        tokio::spawn(async move {
            let data = client.graph().await.ok();
            let _ = events.send(AppEvent::GraphLoaded(gen, data));
        });
    }

    /// Run the three assessment stages. The pacing sleeps keep each stage on
    /// screen long enough to read.
    fn spawn_analysis(&self) {
        let client = self.client.clone();
        let events = self.events_tx.clone();
        let gen = self.fetch_gen;
        tokio::spawn(async move {
            sleep(Duration::from_millis(800)).await;
            let _ = events.send(AppEvent::AnalysisStep(gen, 1));
            match client.predict().await {
                Ok(result) => {
                    sleep(Duration::from_millis(1000)).await;
                    let _ = events.send(AppEvent::AnalysisStep(gen, 2));
                    sleep(Duration::from_millis(500)).await;
                    let _ = events.send(AppEvent::AnalysisDone(gen, result));
                }
                Err(e) => {
                    warn!("prediction failed: {e}");
                    let _ = events.send(AppEvent::AnalysisFailed(gen));
                }
            }
        });
    }

    /// Drain notices and completions, expire toasts, advance animations.
    /// Runs once per frame.
    pub fn tick(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice {
                Notice::SessionExpired => {
                    self.sync.stop();
                    self.toast("Session expired, please log in again".to_string());
                    self.to_login();
                }
                Notice::Error(message) => {
                    if self.route == Route::Login {
                        self.login.fail(message);
                    } else {
                        self.toast(message);
                    }
                }
            }
        }
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
        let now = Instant::now();
        self.toasts.retain(|t| now.duration_since(t.at) < TOAST_TTL);
        self.graph.tick();
        self.analysis.tick();
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginDone(outcome) => {
                if self.route != Route::Login {
                    return;
                }
                match outcome {
                    Ok(username) => {
                        self.login.reset();
                        self.navigate(Route::Dashboard);
                        self.toast(format!("Welcome, {username}"));
                    }
                    Err(message) => self.login.fail(message),
                }
            }
            AppEvent::ZonesLoaded(gen, zones) => {
                if gen != self.fetch_gen || self.route != Route::Map {
                    return;
                }
                match zones {
                    Some(zones) => self.map.set_zones(zones),
                    None => self.map.fetch_failed(),
                }
            }
            AppEvent::GraphLoaded(gen, data) => {
                if gen != self.fetch_gen || self.route != Route::Graph {
                    return;
                }
                match data {
                    Some(data) => self.graph.set_graph(data),
                    None => self.graph.fetch_failed(),
                }
            }
            AppEvent::AnalysisStep(gen, step) => {
                if gen == self.fetch_gen && self.route == Route::Analysis {
                    self.analysis.step_reached(step);
                }
            }
            AppEvent::AnalysisDone(gen, result) => {
                if gen == self.fetch_gen && self.route == Route::Analysis {
                    self.analysis.finish(result);
                }
            }
            AppEvent::AnalysisFailed(gen) => {
                if gen == self.fetch_gen && self.route == Route::Analysis {
                    self.analysis.failed();
                }
            }
        }
    }

    fn toast(&mut self, message: String) {
        self.toasts.push(Toast {
            message,
            at: Instant::now(),
        });
    }

    pub fn render(&self, frame: &mut Frame) {
        if self.route == Route::Login {
            self.login.render(frame, frame.area());
            self.render_toasts(frame);
            return;
        }
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(30)])
            .split(frame.area());
        self.render_sidebar(frame, columns[0]);
        match self.route {
            Route::Dashboard => dashboard::render(frame, columns[1], &self.sync.snapshot()),
            Route::Map => self.map.render(frame, columns[1]),
            Route::Graph => self.graph.render(frame, columns[1]),
            Route::Analysis => self.analysis.render(frame, columns[1]),
            Route::Login => {}
        }
        self.render_toasts(frame);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        let logo = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  JellyWatch",
                Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  marine monitor",
                Style::default().fg(theme::MUTED),
            )),
        ])
        .block(Block::default().borders(Borders::RIGHT));
        frame.render_widget(logo, rows[0]);

        let entries = [
            ("1", "Dashboard", Route::Dashboard),
            ("2", "GIS Map", Route::Map),
            ("3", "Knowledge Graph", Route::Graph),
            ("4", "Analysis", Route::Analysis),
        ];
        let mut lines = vec![Line::from("")];
        for (key, title, route) in entries {
            let style = if self.route == route {
                Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!("  {key}  {title}"), style)));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT)),
            rows[1],
        );

        let user = self
            .client
            .session()
            .username()
            .unwrap_or_else(|| "-".to_string());
        let footer = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  {user}"),
                Style::default().fg(theme::TEAL),
            )),
            Line::from(Span::styled(
                "  l logout  q quit",
                Style::default().fg(theme::MUTED),
            )),
        ])
        .block(Block::default().borders(Borders::RIGHT));
        frame.render_widget(footer, rows[2]);
    }

    /// Newest toasts stack up from the bottom-right corner.
    fn render_toasts(&self, frame: &mut Frame) {
        let area = frame.area();
        if area.width < 16 || area.height < 8 {
            return;
        }
        for (i, toast) in self.toasts.iter().rev().take(3).enumerate() {
            let text_len = toast.message.chars().count().min(56) as u16;
            let width = (text_len + 4).min(area.width - 2);
            let height = 3;
            let y = area.height.saturating_sub((i as u16 + 1) * height + 1);
            let x = area.width.saturating_sub(width + 1);
            let rect = Rect {
                x,
                y,
                width,
                height,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(toast.message.as_str()).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme::WARN)),
                ),
                rect,
            );
        }
    }

    pub async fn shutdown(self) {
        self.sync.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use jw_session::{SessionHandle, SessionStore};

    fn test_client(name: &str) -> (MonitorClient, mpsc::UnboundedReceiver<Notice>) {
        let dir = std::env::temp_dir().join(format!("jw-console-{name}-{}", std::process::id()));
        let session = Arc::new(SessionHandle::new(SessionStore::at(dir.join("session.toml"))));
        let (tx, rx) = mpsc::unbounded_channel();
        let client = MonitorClient::new("http://127.0.0.1:48912", session, Arc::new(tx))
            .unwrap()
            .with_demo_login();
        (client, rx)
    }

    fn zone(id: i64, name: &str) -> MonitoringZone {
        MonitoringZone {
            id,
            name: name.to_string(),
            zone_type: "Buoy".to_string(),
            geometry: Some("POINT(121.0 37.5)".to_string()),
        }
    }

    #[tokio::test]
    async fn starts_at_login_without_a_session() {
        let (client, rx) = test_client("fresh");
        let app = App::new(client, rx);
        assert_eq!(app.route, Route::Login);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn persisted_session_skips_the_login_screen() {
        let (client, rx) = test_client("resumed");
        client.login("admin", "admin").await.unwrap();
        let app = App::new(client.clone(), rx);
        assert_eq!(app.route, Route::Dashboard);
        client.logout().unwrap();
        app.shutdown().await;
    }

    #[tokio::test]
    async fn successful_login_routes_to_the_dashboard() {
        let (client, rx) = test_client("login-route");
        let mut app = App::new(client, rx);
        app.apply(AppEvent::LoginDone(Ok("admin".to_string())));
        assert_eq!(app.route, Route::Dashboard);
        assert_eq!(app.toasts.len(), 1);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn stale_fetches_are_dropped_after_navigation() {
        let (client, rx) = test_client("stale");
        client.login("admin", "admin").await.unwrap();
        let mut app = App::new(client.clone(), rx);

        app.navigate(Route::Map);
        let stale_gen = app.fetch_gen;
        app.navigate(Route::Dashboard);
        app.navigate(Route::Map);

        app.apply(AppEvent::ZonesLoaded(stale_gen, Some(vec![zone(1, "Bohai-A")])));
        assert!(app.map.plotted().is_empty(), "stale zones must not land");

        app.apply(AppEvent::ZonesLoaded(app.fetch_gen, Some(vec![zone(1, "Bohai-A")])));
        assert_eq!(app.map.plotted().len(), 1);
        client.logout().unwrap();
        app.shutdown().await;
    }

    #[tokio::test]
    async fn session_expiry_notice_returns_to_login() {
        let dir = std::env::temp_dir().join(format!("jw-console-expiry-{}", std::process::id()));
        let session = Arc::new(SessionHandle::new(SessionStore::at(dir.join("session.toml"))));
        let (tx, rx) = mpsc::unbounded_channel();
        let client = MonitorClient::new("http://127.0.0.1:48912", session, Arc::new(tx.clone()))
            .unwrap()
            .with_demo_login();
        client.login("admin", "admin").await.unwrap();
        let mut app = App::new(client.clone(), rx);
        assert_eq!(app.route, Route::Dashboard);

        client.session().expire();
        tx.send(Notice::SessionExpired).unwrap();
        app.tick();
        assert_eq!(app.route, Route::Login);
        assert!(app.toasts.iter().any(|t| t.message.contains("expired")));
        app.shutdown().await;
    }

    #[tokio::test]
    async fn toasts_expire_after_their_ttl() {
        let (client, rx) = test_client("toasts");
        let mut app = App::new(client, rx);
        app.toast("fresh".to_string());
        app.toasts.push(Toast {
            message: "old".to_string(),
            at: Instant::now() - TOAST_TTL,
        });
        app.tick();
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].message, "fresh");
        app.shutdown().await;
    }
}
