//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for a published spreadsheet endpoint
//! - Local filesystem for exported CSV files
//! - In-memory payloads for tests and demos

pub mod file;
pub mod http;
pub mod memory;

pub use file::FileSheetSource;
pub use http::HttpSheetSource;
pub use memory::MemorySheetSource;
