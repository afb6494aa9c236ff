use crate::error::{CliError, CliResult};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use molcanon_index::IndexLayout;
use molcanon_ingest::{IngestConfig, IngestPipeline, IngestStats, RedbStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct IngestOpts {
    pub sources: Vec<PathBuf>,
    pub index_dir: PathBuf,
    pub db: PathBuf,
    pub json: bool,
}

pub async fn run(opts: IngestOpts, config: IngestConfig) -> CliResult<()> {
    config.validate()?;
    for source in &opts.sources {
        if !source.is_file() {
            return Err(CliError::Input(format!(
                "source file not found: {}",
                source.display()
            )));
        }
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let watcher = {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; flushing pending batch");
                interrupt.store(true, Ordering::Relaxed);
            }
        })
    };

    let layout = IndexLayout::new(&opts.index_dir);
    let db = opts.db.clone();
    let sources = opts.sources.clone();
    let task = tokio::task::spawn_blocking(move || -> CliResult<IngestStats> {
        let store = RedbStore::create(&db)?;
        let mut pipeline = IngestPipeline::open(config, &layout, store)?.with_interrupt(interrupt);
        Ok(pipeline.run(&sources)?)
    });
    let result = task
        .await
        .map_err(|e| CliError::Input(format!("ingest task failed: {e}")));
    watcher.abort();
    let stats = result??;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats_table(&stats));
        println!("Structures written to {}", opts.db.display());
    }
    if stats.interrupted {
        eprintln!(
            "{} interrupted; records after the last flushed batch were not ingested",
            "warning:".yellow().bold()
        );
    }
    Ok(())
}

fn stats_table(stats: &IngestStats) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["metric", "value"]);
    let rows: [(&str, u64); 11] = [
        ("processed", stats.processed),
        ("stored", stats.stored),
        ("replaced", stats.replaced),
        ("skipped", stats.skipped),
        ("malformed", stats.malformed),
        ("conflicts resolved", stats.conflicts_resolved),
        ("canonical remappings", stats.remappings),
        ("memory warnings", stats.memory_warnings),
        ("batches flushed", stats.batches_flushed),
        ("entries written", stats.entries_written),
        ("units completed", stats.units_completed),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value.to_string()]);
    }
    table
}
