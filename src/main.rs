mod app;
mod color;
mod config;
mod grid;
mod lightning;
mod motes;
mod orbs;
mod stats;
mod surface;
mod trail;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    app::run(cli)
}
