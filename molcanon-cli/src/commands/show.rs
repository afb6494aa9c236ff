use crate::error::{CliError, CliResult};
use molcanon_ingest::{RedbStore, StructurePayload, StructureStore};
use std::path::Path;

pub fn run(key: &str, db: &Path) -> CliResult<()> {
    let store = RedbStore::open(db)?;
    let bytes = store
        .get(key)?
        .ok_or_else(|| CliError::NotFound(format!("no structure stored for '{key}'")))?;
    let payload = StructurePayload::from_bytes(&bytes)
        .map_err(|e| CliError::Input(format!("stored payload for '{key}' is corrupt: {e}")))?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
