use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codanna-kgraph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Builds a cross-file code knowledge graph for Kotlin and Java repositories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a directory, index every Kotlin/Java file, and emit the graph.
    Index {
        /// Root directory to index.
        path: PathBuf,

        /// Path to a config TOML file (defaults to `./codanna-kgraph.toml`).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parse and resolve everything but discard nodes/edges instead of
        /// retaining them, logging batch counts at `debug` level only.
        #[arg(long)]
        dry_run: bool,
    },

    /// Load and print the effective configuration, without indexing anything.
    CheckConfig {
        /// Path to a config TOML file (defaults to `./codanna-kgraph.toml`).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}
