//! Interactive terminal dashboard for the Jellyfish Warning System.

use std::fs::File;
use std::io::{self, IsTerminal, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use jw_client::{resolve_server, MonitorClient};
use jw_session::{SessionHandle, SessionStore};

mod app;
mod theme;
mod views;

use app::App;

#[derive(Parser)]
#[command(
    name = "jw-console",
    version,
    about = "Jellyfish Warning System terminal dashboard"
)]
struct Cli {
    /// API server URL. Defaults to JELLYWATCH_SERVER, then the local server.
    #[arg(long)]
    server: Option<String>,

    /// Accept the demo credentials locally instead of calling the server.
    #[arg(long)]
    demo: bool,
}

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    if !io::stdout().is_terminal() {
        anyhow::bail!("jw-console needs an interactive terminal; use jw-cli for scripted access");
    }

    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let session = Arc::new(SessionHandle::new(SessionStore::default_location()?));
    let mut client = MonitorClient::new(
        &resolve_server(cli.server.as_deref()),
        session,
        Arc::new(notice_tx),
    )?;
    if cli.demo {
        client = client.with_demo_login();
    }

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, App::new(client, notice_rx)).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> anyhow::Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| app.render(frame))?;
        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        if app.should_quit {
            break;
        }
    }
    app.shutdown().await;
    Ok(())
}

/// The alternate screen owns the terminal, so logging goes to a file, and
/// only when `JELLYWATCH_LOG` names one.
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = std::env::var("JELLYWATCH_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Put the terminal back together before the default panic report prints,
/// otherwise the message lands on the alternate screen and vanishes.
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}
