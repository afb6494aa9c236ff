//! molcanon CLI library.
//!
//! Argument types, command handlers and error rendering for the `molcanon`
//! binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use cli::{Cli, Commands};
use molcanon_index::DumpPaths;

/// Dispatch a parsed [`Cli`] to the appropriate command handler.
pub async fn run(cli: Cli) -> error::CliResult<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Build {
            preferred,
            parent,
            identifiers,
            identifier_limit,
            out,
        } => {
            let dumps = DumpPaths {
                preferred,
                parent,
                structural_keys: identifiers,
                key_limit: identifier_limit,
            };
            commands::build::run(dumps, out)
        }

        Commands::Ingest {
            sources,
            index_dir,
            db,
            batch_size,
            cache_capacity,
            max_memory_percent,
            strategy,
            json,
        } => {
            let mut config = config::load_ingest_config(config_path)?;
            // Explicit flags take precedence over the config file.
            if let Some(n) = batch_size {
                config.batch_size = n;
            }
            if let Some(n) = cache_capacity {
                config.resolver.cache_capacity = n;
            }
            if let Some(p) = max_memory_percent {
                config.max_memory_percent = p;
            }
            if let Some(s) = strategy {
                config.resolver.read_strategy = s.into();
            }
            let opts = commands::ingest::IngestOpts {
                sources,
                index_dir,
                db,
                json,
            };
            commands::ingest::run(opts, config).await
        }

        Commands::Lookup {
            id,
            index_dir,
            strategy,
        } => {
            let mut resolver = config::load_ingest_config(config_path)?.resolver;
            if let Some(s) = strategy {
                resolver.read_strategy = s.into();
            }
            commands::lookup::run(&id, &index_dir, &resolver)
        }

        Commands::Show { key, db } => commands::show::run(&key, &db),

        Commands::Info { db, sample } => commands::info::run(&db, sample),
    }
}
