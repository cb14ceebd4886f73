//! ## skarv-cli
//! **Operational interface for the allocation service**
//!
//! Installs the simulated allocation module, runs the loader against it,
//! and drives the front end: probe the backend, run one-shot allocations,
//! or hammer the service from many threads.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    commands::run_command(Cli::parse())
}
