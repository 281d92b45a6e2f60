use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cutgraph",
    about = "cutgraph: build and evaluate named three-valued selection cuts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in cut type ids
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build every cut in a configuration and report it
    Check {
        /// Cut file (or manager setup file with --setup)
        config: String,

        /// Treat CONFIG as a manager setup file
        #[arg(long)]
        setup: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process one cut repeatedly and report its counters
    Run {
        /// Cut file (or manager setup file with --setup)
        config: String,

        /// Name of the cut to process
        #[arg(long)]
        cut: String,

        /// Number of entries to process
        #[arg(long, default_value_t = 1)]
        entries: u64,

        /// Treat CONFIG as a manager setup file
        #[arg(long)]
        setup: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
