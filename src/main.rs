//! Dungeon queue entry point.
//!
//! Forms parties from a player roster and runs them through a bounded pool
//! of dungeon instances.

use clap::Parser;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
