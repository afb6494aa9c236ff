use crate::error::{CliError, CliResult};
use molcanon_index::{CompoundId, IndexLayout, KeyStringIndex};
use molcanon_resolve::{CanonicalResolver, Canonicalize, ResolverConfig};
use std::path::Path;

pub fn run(raw_id: &str, index_dir: &Path, config: &ResolverConfig) -> CliResult<()> {
    let id: CompoundId = raw_id
        .parse()
        .map_err(|e| CliError::Usage(format!("{e}")))?;
    let layout = IndexLayout::new(index_dir);
    let mut resolver = CanonicalResolver::open(&layout, config)?;

    let preferred = resolver.preferred(id)?;
    let parent = resolver.parent(id)?;
    let canonical = resolver.canonical(id)?;

    println!("Id:             {id}");
    println!("Preferred:      {preferred}");
    println!("Parent:         {parent}");
    println!("Canonical:      {canonical}");

    if let Some(keys) = KeyStringIndex::load_optional(&layout.structural_keys())? {
        let key = keys.lookup(id).or_else(|| keys.lookup(canonical));
        println!("Structural key: {}", key.unwrap_or("(none)"));
    }
    Ok(())
}
