//! JW CLI - Command line tool for querying the Jellyfish Warning System.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "jw-cli",
    version,
    about = "Jellyfish Warning System monitoring toolkit"
)]
struct Cli {
    /// Server base URL (overrides JELLYWATCH_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Accept the built-in demo credentials without a server round trip
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: jw_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    jw_cmd::run(cli.command, cli.server.as_deref(), cli.demo).await
}
