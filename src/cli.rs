//! CLI mode implementation
//!
//! Argument structs double as MCP input schemas

use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// eatlist CLI
#[derive(Parser)]
#[command(name = "eatlist")]
#[command(about = "Add restaurants and bars by rough name, then find them again", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve an establishment name and store its details
    Add(AddArgs),
    /// Fuzzy-search stored establishments
    Search(SearchArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
}

/// Add tool arguments
#[derive(Parser, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct AddArgs {
    /// Establishment name as typed, typos welcome
    #[arg(short = 'n', long)]
    #[schemars(description = "Establishment name as typed, typos welcome")]
    pub name: String,
}

/// Search tool arguments
#[derive(Parser, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct SearchArgs {
    /// Name, cuisine or category to look for (case-insensitive)
    #[arg(short = 't', long)]
    #[schemars(description = "Name, cuisine or category to look for (case-insensitive)")]
    pub term: String,
}

/// HTTP server arguments
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short = 'b', long, env = "EATLIST_BIND")]
    pub bind: Option<String>,
}
