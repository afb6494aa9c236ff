use crate::error::CliResult;
use comfy_table::{ContentArrangement, Table};
use molcanon_index::{build_all, BuildStats, DumpPaths, IndexLayout};
use std::path::PathBuf;

pub fn run(dumps: DumpPaths, out: PathBuf) -> CliResult<()> {
    let layout = IndexLayout::new(out);
    let summary = build_all(&dumps, &layout)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "index",
        "lines",
        "written",
        "malformed",
        "identity",
        "duplicates",
        "bytes",
    ]);
    table.add_row(row("preferred", &summary.preferred));
    table.add_row(row("parent", &summary.parent));
    if let Some(stats) = &summary.structural_keys {
        table.add_row(row("structural_keys", stats));
    }

    println!("{table}");
    println!("Indexes written to {}", layout.dir().display());
    Ok(())
}

fn row(name: &str, stats: &BuildStats) -> Vec<String> {
    vec![
        name.to_string(),
        stats.lines_read.to_string(),
        stats.records_written.to_string(),
        stats.skipped_malformed.to_string(),
        stats.skipped_identity.to_string(),
        stats.duplicate_keys.to_string(),
        stats.bytes_written.to_string(),
    ]
}
