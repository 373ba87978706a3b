//! plugindocs CLI — documentation builder for plugin collections.
//!
//! Downloads the base platform and the collections named in a dependency
//! file, then renders one reStructuredText page per plugin.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
