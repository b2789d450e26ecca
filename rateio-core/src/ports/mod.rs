//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The ingestion
//! pipeline depends only on these traits, not on concrete implementations.

mod sheet_source;

pub use sheet_source::SheetSource;
