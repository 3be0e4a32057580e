//! eatlist MCP Server, CLI & HTTP API (Rust)
//!
//! Dual-mode application:
//! - MCP Server Mode (default): Model Context Protocol server using stdio
//! - CLI Mode: Command-line utility for direct tool execution, or `serve`
//!   for the HTTP API
//!
//! Implements two tools:
//! - `add_establishment(name)` - Resolve a rough name and store the place
//! - `search_establishments(term)` - Fuzzy-search stored places

mod api;
mod cli;
mod config;
mod error;
mod http;
mod mcp;
mod model;
mod resolver;
mod search;
mod storage;
mod tools;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests_add_then_search;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use error::AppError;
use std::sync::Arc;
use tools::{with_deadline, Services};

#[tokio::main]
async fn main() -> Result<()> {
    // Detect mode: CLI if args present, MCP server otherwise
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        run_cli_mode().await
    } else {
        run_mcp_mode().await
    }
}

fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();
}

/// Run in CLI mode
async fn run_cli_mode() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    init_logging(log_level);

    let result = match cli.command {
        Some(command) => execute_command(command).await,
        None => {
            eprintln!("Error: No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn execute_command(command: Commands) -> Result<String, AppError> {
    let settings = Settings::from_env()?;
    let services = Services::from_settings(&settings)?;

    match command {
        Commands::Add(args) => with_deadline("Add", tools::add::execute_add(args, &services)).await,
        Commands::Search(args) => {
            with_deadline("Search", tools::search::execute_search(args, &services)).await
        }
        Commands::Serve(args) => {
            let bind = args.bind.unwrap_or_else(|| settings.bind.clone());
            api::serve(Arc::new(services), &bind).await?;
            Ok(String::new())
        }
    }
}

/// Run in MCP server mode
async fn run_mcp_mode() -> Result<()> {
    init_logging("info");

    let settings = Settings::from_env()?;
    let services = Services::from_settings(&settings)?;
    mcp::serve_stdio(&services).await
}
