use clap::{Parser, Subcommand, ValueEnum};
use molcanon_index::ReadStrategy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "molcanon",
    about = "Compound-id canonicalization indexes and deduplicating structure ingestion",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a TOML config file with an [ingest] table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build index files from raw mapping dumps
    Build {
        /// Preferred-id dump (id, preferred id)
        #[arg(long)]
        preferred: PathBuf,

        /// Parent-id dump (id, parent id)
        #[arg(long)]
        parent: PathBuf,

        /// Identifier dump (id, identifier, structural key)
        #[arg(long)]
        identifiers: Option<PathBuf>,

        /// Read at most this many lines of the identifier dump
        #[arg(long, requires = "identifiers")]
        identifier_limit: Option<usize>,

        /// Output index directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Ingest record files into the structure database
    Ingest {
        /// JSON-lines record files (optionally gzip-compressed)
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Directory holding the index files
        #[arg(long)]
        index_dir: PathBuf,

        /// Structure database file
        #[arg(long)]
        db: PathBuf,

        /// Decisions per storage write
        #[arg(long)]
        batch_size: Option<usize>,

        /// Entries per lookup cache
        #[arg(long)]
        cache_capacity: Option<usize>,

        /// Memory threshold (percent of RAM) that triggers cache clearing
        #[arg(long)]
        max_memory_percent: Option<f64>,

        /// How index files are read
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Print run statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve one compound id to its preferred, parent and canonical forms
    Lookup {
        /// Compound id
        id: String,

        /// Directory holding the index files
        #[arg(long)]
        index_dir: PathBuf,

        /// How index files are read
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },

    /// Print the stored structure for a structural key
    Show {
        /// Structural key
        key: String,

        /// Structure database file
        #[arg(long)]
        db: PathBuf,
    },

    /// Summarize the structure database
    Info {
        /// Structure database file
        #[arg(long)]
        db: PathBuf,

        /// Entries sampled for size estimates
        #[arg(long, default_value_t = 100)]
        sample: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Load each index fully into memory
    Memory,
    /// Binary search directly on disk
    Disk,
}

impl From<StrategyArg> for ReadStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Memory => ReadStrategy::InMemory,
            StrategyArg::Disk => ReadStrategy::OnDisk,
        }
    }
}
