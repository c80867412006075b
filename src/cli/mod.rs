//! CLI for the gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Parrot Gateway - chat with multiple LLM providers, tools included
#[derive(Parser)]
#[command(name = "parrot-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
