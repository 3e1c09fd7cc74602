use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tidysweep",
    about = "Find and safely reclaim temp files, app caches and stale dev artifacts",
    version
)]
pub struct Cli {
    /// Config file (defaults to <config dir>/tidysweep/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan for reclaimable files (dry-run, no deletion)
    Scan {
        /// Only scan one target key (e.g. "TEMP", "DISCORD", "DEV_BLOAT")
        #[arg(long)]
        category: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move eligible files to the trash (requires --confirm to actually delete)
    Clean {
        /// Actually delete files. Without this flag, behaves like scan.
        #[arg(long)]
        confirm: bool,

        /// Only clean one target key
        #[arg(long)]
        category: Option<String>,

        /// Delete permanently when the trash refuses an item
        #[arg(long)]
        permanent_fallback: bool,

        /// Do not empty the trash afterwards
        #[arg(long)]
        no_empty_trash: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}
