//! External services and the ingestion flow built on them

pub mod catalog;
pub mod ingest;
