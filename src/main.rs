//! Command line interface for traceable requirements in reStructuredText
//! sources.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
