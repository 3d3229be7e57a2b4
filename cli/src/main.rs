//! `pawever` - command-line access to the PawEver clinic API.
//!
//! Every subcommand maps onto one client operation and prints the response
//! envelope as pretty JSON. Failures are reported with the same message a
//! front-end would show inline.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pawever_core::PawEverClient;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = PawEverClient::new(&cli.base_url);
    let envelope = cli::run(&client, cli.command)?;
    println!("{}", serde_json::to_string_pretty(envelope.as_value())?);
    Ok(())
}
