pub mod build;
pub mod info;
pub mod ingest;
pub mod lookup;
pub mod show;
