//! Command implementations for the JellyWatch CLI.
//!
//! Each subcommand is a thin script over `jw-client`: authenticate, fetch,
//! print. The `watch` subcommand drives the same synchronization engine the
//! console dashboard uses.

use std::sync::Arc;

use clap::Subcommand;

use jw_client::{resolve_server, LogSink, MonitorClient};
use jw_session::{SessionHandle, SessionStore};

pub mod analyze;
pub mod auth;
pub mod graph;
pub mod monitor;
pub mod watch;

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Drop the stored session
    Logout,

    /// List the monitoring zones
    Zones,

    /// Show the latest reading per zone
    Realtime {
        /// Only show the reading for this zone
        #[arg(long)]
        zone: Option<i64>,
    },

    /// Show historical readings for one zone (newest first)
    History {
        /// Zone id
        zone: i64,

        /// Write the readings to a CSV file instead of printing them
        #[arg(long)]
        csv: Option<String>,
    },

    /// Print the ecological knowledge graph
    Graph,

    /// Trigger an analysis run and print the warning result
    Predict,

    /// Poll dashboard data and print one line per applied refresh
    Watch {
        /// Zone to monitor instead of the default selection
        #[arg(long)]
        zone: Option<i64>,
    },
}

pub async fn run(command: Command, server: Option<&str>, demo: bool) -> anyhow::Result<()> {
    let client = build_client(server, demo)?;
    match command {
        Command::Login { username, password } => {
            auth::run_login(&client, &username, &password).await
        }
        Command::Logout => auth::run_logout(&client),
        Command::Zones => monitor::run_zones(&client).await,
        Command::Realtime { zone } => monitor::run_realtime(&client, zone).await,
        Command::History { zone, csv } => {
            monitor::run_history(&client, zone, csv.as_deref()).await
        }
        Command::Graph => graph::run_graph(&client).await,
        Command::Predict => analyze::run_predict(&client).await,
        Command::Watch { zone } => watch::run_watch(&client, zone).await,
    }
}

fn build_client(server: Option<&str>, demo: bool) -> anyhow::Result<MonitorClient> {
    let session = Arc::new(SessionHandle::new(SessionStore::default_location()?));
    let client = MonitorClient::new(&resolve_server(server), session, Arc::new(LogSink))?;
    Ok(if demo { client.with_demo_login() } else { client })
}
