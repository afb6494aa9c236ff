use crate::error::CliResult;
use molcanon_ingest::{RedbStore, StructurePayload, StructureStore};
use std::path::Path;

pub fn run(db: &Path, sample: usize) -> CliResult<()> {
    let store = RedbStore::open(db)?;
    let count = store.count()?;
    let entries = store.sample(sample)?;

    println!("Database:       {}", store.path().display());
    println!("Structures:     {count}");

    let mut bytes = 0usize;
    let mut atoms = 0usize;
    let mut bonds = 0usize;
    let mut decoded = 0usize;
    for (_, value) in &entries {
        bytes += value.len();
        if let Ok(payload) = StructurePayload::from_bytes(value) {
            atoms += payload.atoms.len();
            bonds += payload.bonds.len();
            decoded += 1;
        }
    }
    if entries.is_empty() {
        return Ok(());
    }

    let avg_bytes = bytes as f64 / entries.len() as f64;
    println!("Sampled:        {}", entries.len());
    println!("Avg payload:    {avg_bytes:.1} bytes");
    if decoded > 0 {
        println!("Avg atoms:      {:.1}", atoms as f64 / decoded as f64);
        println!("Avg bonds:      {:.1}", bonds as f64 / decoded as f64);
    }
    if decoded < entries.len() {
        println!("Undecodable:    {}", entries.len() - decoded);
    }
    println!(
        "Est. total:     {:.1} MiB",
        avg_bytes * count as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
